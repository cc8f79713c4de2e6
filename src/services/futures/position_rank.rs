//! 大连商品交易所-每日持仓排名

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use super::common::{extract_variety, DCE_HOME_URL, DCE_VOL_RANK_URL};
use crate::models::table::parse_date_str;
use crate::models::DataTable;
use crate::utils::parse::{decode_auto, read_zip_entries};
use crate::utils::{FetchError, HttpClient, RequestSpec};

const RANK_COLUMNS: [&str; 12] = [
    "名次",
    "会员简称-成交量",
    "成交量",
    "成交量-增减",
    "会员简称-持买单量",
    "持买单量",
    "持买单量-增减",
    "会员简称-持卖单量",
    "持卖单量",
    "持卖单量-增减",
    "合约",
    "品种",
];

/// 排名段落中的一行：会员简称, 数量, 增减
type RankEntry = (String, Option<i64>, Option<i64>);

/// 大连商品交易所-每日持仓排名-具体合约
/// 对应 akshare 的 futures_dce_position_rank() 函数
///
/// date: 交易日期 YYYYMMDD；vars: 品种代码过滤，None 为全部
pub async fn futures_dce_position_rank(
    client: &HttpClient,
    date: &str,
    vars: Option<&[String]>,
) -> Result<DataTable> {
    fetch_dce_rank(client, DCE_HOME_URL, DCE_VOL_RANK_URL, date, vars).await
}

/// 先访问 home_url 获取 Cookie，再向 rank_url 请求 ZIP 压缩包
async fn fetch_dce_rank(
    client: &HttpClient,
    home_url: &str,
    rank_url: &str,
    date: &str,
    vars: Option<&[String]>,
) -> Result<DataTable> {
    if date.len() != 8 || parse_date_str(date).is_none() {
        return Err(anyhow!("日期格式应为 YYYYMMDD: {}", date));
    }

    // 大商所校验 Cookie，先访问页面
    client.warm_up(home_url).await;

    let payload = json!({
        "tradeDate": date,
        "varietyId": "a",
        "contractId": "a2601",
        "tradeType": "1",
        "lang": "zh"
    });
    let spec = RequestSpec::post(rank_url)
        .json(payload)
        .header("Accept", "*/*")
        .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
        .header("Origin", "http://www.dce.com.cn")
        .header("Referer", home_url)
        .cached();

    log::info!("请求大商所持仓排名数据(ZIP) date={}", date);
    let bytes = match client.send(&spec).await {
        Ok(bytes) => bytes,
        Err(FetchError::Status { status: 412, .. }) => {
            return Err(anyhow!(
                "大商所API访问被拒绝(412)，该交易所有反爬虫机制，请稍后重试或在浏览器中手动下载数据"
            ));
        }
        Err(e) => return Err(anyhow!("获取大商所持仓排名数据失败: {}", e)),
    };

    let entries = read_zip_entries(&bytes)
        .map_err(|e| anyhow!("{}，可能是非交易日或数据不存在", e))?;
    let table = parse_rank_entries(&entries, date, vars);

    log::info!("解析到 {} 条大商所持仓排名数据", table.len());
    Ok(table)
}

/// 合并压缩包中各合约文件
///
/// 文件名形如 `20241220_a2501_成交量_买持仓_卖持仓排名.txt`
fn parse_rank_entries(entries: &[(String, Vec<u8>)], date: &str, vars: Option<&[String]>) -> DataTable {
    let mut table = DataTable::new(&RANK_COLUMNS);
    let mut files: Vec<(String, String, &[u8])> = Vec::new();

    for (name, content) in entries {
        let file_name = name.rsplit('/').next().unwrap_or(name);
        if !file_name.starts_with(date) {
            continue;
        }
        let Some(contract) = file_name.split('_').nth(1) else {
            continue;
        };
        let contract = contract.to_uppercase();
        let variety = extract_variety(&contract);

        if let Some(vars) = vars {
            if !vars.iter().any(|v| v.eq_ignore_ascii_case(&variety)) {
                continue;
            }
        }
        files.push((contract, variety, content.as_slice()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    for (contract, variety, content) in files {
        match parse_rank_file(&decode_auto(content)) {
            Ok(rows) => {
                for (i, (vol, long, short)) in rows.into_iter().enumerate() {
                    table.push_row(vec![
                        Value::from(i as u64 + 1),
                        Value::String(vol.0),
                        opt(vol.1),
                        opt(vol.2),
                        Value::String(long.0),
                        opt(long.1),
                        opt(long.2),
                        Value::String(short.0),
                        opt(short.1),
                        opt(short.2),
                        Value::String(contract.clone()),
                        Value::String(variety.clone()),
                    ]);
                }
            }
            Err(e) => log::warn!("解析 {} 持仓排名失败: {}", contract, e),
        }
    }

    table
}

fn opt(v: Option<i64>) -> Value {
    v.map(Value::from).unwrap_or(Value::Null)
}

/// 解析单个合约文件
///
/// 文件依次包含成交量、持买单量、持卖单量三个段落，
/// 每段以 "名次" 表头开始，以 "总计" 行结束
fn parse_rank_file(text: &str) -> Result<Vec<(RankEntry, RankEntry, RankEntry)>> {
    let lines: Vec<&str> = text.lines().collect();

    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.trim_start().starts_with("名次"))
        .map(|(i, _)| i)
        .collect();
    let ends: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.contains("总计") || l.contains("合计"))
        .map(|(i, _)| i)
        .collect();

    if starts.len() < 3 || ends.len() < 3 {
        return Err(anyhow!("未找到完整的三个排名表格"));
    }

    let section = |k: usize| parse_rank_section(&lines[starts[k] + 1..ends[k].max(starts[k] + 1)]);
    let (vol, long, short) = (section(0), section(1), section(2));

    let max_len = vol.len().max(long.len()).max(short.len());
    let row = |s: &[RankEntry], i: usize| s.get(i).cloned().unwrap_or_default();

    Ok((0..max_len)
        .map(|i| (row(&vol, i), row(&long, i), row(&short, i)))
        .collect())
}

/// 解析排名段落，每行: 名次 会员简称 数量 增减
fn parse_rank_section(lines: &[&str]) -> Vec<RankEntry> {
    let parse_num = |s: &str| s.trim().replace(',', "").parse::<i64>().ok();

    lines
        .iter()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(['\t', ' ']).filter(|s| !s.trim().is_empty()).collect();
            if fields.len() < 4 || fields[0].trim().parse::<u32>().is_err() {
                return None;
            }
            let name = fields[1].trim().to_string();
            Some((name, parse_num(fields[2]), parse_num(fields[3])))
        })
        .collect()
}
