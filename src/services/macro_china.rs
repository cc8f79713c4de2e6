//! 中国宏观经济数据
//!
//! 全部来自东方财富数据中心，按报告期倒序返回

use anyhow::Result;
use serde_json::Value;

use crate::models::DataTable;
use crate::services::eastmoney::{fetch_datacenter, EM_DATACENTER_URL};
use crate::utils::HttpClient;

const CPI_RENAME: [(&str, &str); 13] = [
    ("TIME", "月份"),
    ("NATIONAL_BASE", "全国-当月"),
    ("NATIONAL_SAME", "全国-同比增长"),
    ("NATIONAL_SEQUENTIAL", "全国-环比增长"),
    ("NATIONAL_ACCUMULATE", "全国-累计"),
    ("CITY_BASE", "城市-当月"),
    ("CITY_SAME", "城市-同比增长"),
    ("CITY_SEQUENTIAL", "城市-环比增长"),
    ("CITY_ACCUMULATE", "城市-累计"),
    ("RURAL_BASE", "农村-当月"),
    ("RURAL_SAME", "农村-同比增长"),
    ("RURAL_SEQUENTIAL", "农村-环比增长"),
    ("RURAL_ACCUMULATE", "农村-累计"),
];

const GDP_RENAME: [(&str, &str); 9] = [
    ("TIME", "季度"),
    ("DOMESTICL_PRODUCT_BASE", "国内生产总值-绝对值"),
    ("SUM_SAME", "国内生产总值-同比增长"),
    ("FIRST_PRODUCT_BASE", "第一产业-绝对值"),
    ("FIRST_SAME", "第一产业-同比增长"),
    ("SECOND_PRODUCT_BASE", "第二产业-绝对值"),
    ("SECOND_SAME", "第二产业-同比增长"),
    ("THIRD_PRODUCT_BASE", "第三产业-绝对值"),
    ("THIRD_SAME", "第三产业-同比增长"),
];

const PMI_RENAME: [(&str, &str); 5] = [
    ("TIME", "月份"),
    ("MAKE_INDEX", "制造业-指数"),
    ("MAKE_SAME", "制造业-同比增长"),
    ("NMAKE_INDEX", "非制造业-指数"),
    ("NMAKE_SAME", "非制造业-同比增长"),
];

const MONEY_SUPPLY_RENAME: [(&str, &str); 10] = [
    ("TIME", "月份"),
    ("BASIC_CURRENCY", "货币和准货币(M2)-数量(亿元)"),
    ("BASIC_CURRENCY_SAME", "货币和准货币(M2)-同比增长"),
    ("BASIC_CURRENCY_SEQUENTIAL", "货币和准货币(M2)-环比增长"),
    ("CURRENCY", "货币(M1)-数量(亿元)"),
    ("CURRENCY_SAME", "货币(M1)-同比增长"),
    ("CURRENCY_SEQUENTIAL", "货币(M1)-环比增长"),
    ("FREE_CASH", "流通中的现金(M0)-数量(亿元)"),
    ("FREE_CASH_SAME", "流通中的现金(M0)-同比增长"),
    ("FREE_CASH_SEQUENTIAL", "流通中的现金(M0)-环比增长"),
];

/// 拉取报表并整理，首列为报告期文本，其余列转为数值
async fn fetch_report(
    client: &HttpClient,
    report_name: &str,
    rename: &[(&str, &str)],
) -> Result<DataTable> {
    let records = fetch_datacenter(client, EM_DATACENTER_URL, report_name, "REPORT_DATE", None).await?;
    Ok(report_table(&records, rename))
}

fn report_table(records: &[Value], rename: &[(&str, &str)]) -> DataTable {
    let keys: Vec<&str> = rename.iter().map(|(k, _)| *k).collect();
    let numeric: Vec<&str> = rename.iter().skip(1).map(|(_, v)| *v).collect();

    DataTable::from_records(records, &keys)
        .rename(rename)
        .to_numeric(&numeric)
}

/// 东方财富-中国居民消费价格指数
/// 对应 akshare 的 macro_china_cpi() 函数
pub async fn macro_china_cpi(client: &HttpClient) -> Result<DataTable> {
    fetch_report(client, "RPT_ECONOMY_CPI", &CPI_RENAME).await
}

/// 东方财富-中国国内生产总值
/// 对应 akshare 的 macro_china_gdp() 函数
pub async fn macro_china_gdp(client: &HttpClient) -> Result<DataTable> {
    fetch_report(client, "RPT_ECONOMY_GDP", &GDP_RENAME).await
}

/// 东方财富-中国采购经理人指数
/// 对应 akshare 的 macro_china_pmi() 函数
pub async fn macro_china_pmi(client: &HttpClient) -> Result<DataTable> {
    fetch_report(client, "RPT_ECONOMY_PMI", &PMI_RENAME).await
}

/// 东方财富-货币供应量
/// 对应 akshare 的 macro_china_money_supply() 函数
pub async fn macro_china_money_supply(client: &HttpClient) -> Result<DataTable> {
    fetch_report(client, "RPT_ECONOMY_CURRENCY_SUPPLY", &MONEY_SUPPLY_RENAME).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::RetryPolicy;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_report_table_pmi() {
        let records = vec![
            json!({"REPORT_DATE": "2024-02-01 00:00:00", "TIME": "2024年02月份",
                   "MAKE_INDEX": 49.1, "MAKE_SAME": -5.38, "NMAKE_INDEX": 51.4, "NMAKE_SAME": null}),
            json!({"REPORT_DATE": "2024-01-01 00:00:00", "TIME": "2024年01月份",
                   "MAKE_INDEX": 49.2, "MAKE_SAME": -1.4, "NMAKE_INDEX": "50.7", "NMAKE_SAME": -0.58}),
        ];

        let table = report_table(&records, &PMI_RENAME);
        assert_eq!(
            table.columns,
            vec!["月份", "制造业-指数", "制造业-同比增长", "非制造业-指数", "非制造业-同比增长"]
        );
        assert_eq!(table.cell(0, "月份"), Some(&json!("2024年02月份")));
        assert_eq!(table.cell(0, "非制造业-同比增长"), Some(&Value::Null));
        assert_eq!(table.cell(1, "非制造业-指数"), Some(&json!(50.7)));
    }

    #[test]
    fn test_column_counts() {
        assert_eq!(report_table(&[], &CPI_RENAME).columns.len(), 13);
        assert_eq!(report_table(&[], &GDP_RENAME).columns.len(), 9);
        assert_eq!(report_table(&[], &MONEY_SUPPLY_RENAME).columns.len(), 10);
    }

    #[tokio::test]
    async fn test_null_result_is_empty_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("reportName", "RPT_ECONOMY_GDP"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "version": null, "result": null, "success": false, "message": "返回数据为空", "code": 9201
            })))
            .mount(&server)
            .await;

        let client = HttpClient::new(RetryPolicy::immediate(1)).unwrap();
        let records = fetch_datacenter(&client, &server.uri(), "RPT_ECONOMY_GDP", "REPORT_DATE", None)
            .await
            .unwrap();
        let table = report_table(&records, &GDP_RENAME);

        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 9);
    }
}
