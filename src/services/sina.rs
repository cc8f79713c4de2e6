//! 新浪财经公共接口
//!
//! - 行情中心节点列表（Market_Center.getHQNodeData），股票、债券、指数共用
//! - 实时行情（hq.sinajs.cn），GBK 编码

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::utils::parse::{decode_auto, sina_hq_fields};
use crate::utils::{HttpClient, RequestSpec};

/// 行情中心 API 根路径
pub const SINA_MARKET_CENTER_URL: &str =
    "https://vip.stock.finance.sina.com.cn/quotes_service/api/json_v2.php";
/// 实时行情 API
pub const SINA_HQ_URL: &str = "https://hq.sinajs.cn";

const NODE_PAGE_SIZE: usize = 80;

/// 查询节点下的品种数量
///
/// 返回形如 `"5371"` 的带引号字符串
pub async fn fetch_node_count(client: &HttpClient, base_url: &str, node: &str) -> Result<usize> {
    let spec = RequestSpec::get(format!("{}/Market_Center.getHQNodeStockCount", base_url))
        .query("node", node)
        .no_cache();

    let body = client.send(&spec).await?;
    let text = decode_auto(&body);
    text.trim()
        .trim_matches('"')
        .parse::<usize>()
        .map_err(|_| anyhow!("无法解析节点 {} 的数量: {}", node, text.trim()))
}

/// 分页拉取节点下所有品种的行情记录
pub async fn fetch_node_data(client: &HttpClient, base_url: &str, node: &str) -> Result<Vec<Value>> {
    let count = fetch_node_count(client, base_url, node).await?;
    let pages = count.div_ceil(NODE_PAGE_SIZE);
    log::info!("新浪节点 {} 共 {} 条，{} 页", node, count, pages);

    let mut records = Vec::with_capacity(count);
    for page in 1..=pages {
        let spec = RequestSpec::get(format!("{}/Market_Center.getHQNodeData", base_url))
            .query("page", page)
            .query("num", NODE_PAGE_SIZE)
            .queries(&[
                ("sort", "symbol"),
                ("asc", "1"),
                ("node", node),
                ("symbol", ""),
                ("_s_r_a", "page"),
            ])
            .no_cache();

        let body = client.send(&spec).await?;
        let text = decode_auto(&body);
        let value: Value = serde_json::from_str(text.trim())
            .map_err(|e| anyhow!("解析新浪节点 {} 第{}页失败: {}", node, page, e))?;

        match value.as_array() {
            Some(items) if !items.is_empty() => records.extend(items.iter().cloned()),
            _ => break,
        }
    }

    Ok(records)
}

/// 请求实时行情，返回 (代码, 字段) 列表
pub async fn fetch_hq(
    client: &HttpClient,
    base_url: &str,
    codes: &[String],
) -> Result<Vec<(String, Vec<String>)>> {
    if codes.is_empty() {
        return Err(anyhow!("代码列表为空"));
    }

    let url = format!("{}/list={}", base_url, codes.join(","));
    log::info!("请求新浪实时行情 URL: {}", url);

    let spec = RequestSpec::get(url)
        .header("Referer", "https://finance.sina.com.cn/")
        .no_cache();
    let text = client.gbk_text(&spec).await?;

    Ok(sina_hq_fields(&text))
}
