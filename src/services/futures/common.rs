//! 期货公共常量和辅助函数

// ==================== 新浪期货 API 常量 ====================

/// 新浪期货日K线 API
pub const SINA_FUTURES_DAILY_API: &str = "https://stock2.finance.sina.com.cn/futures/api/jsonp.php/var%20_temp=/InnerFuturesNewService.getDailyKLine";

// ==================== 其他数据源常量 ====================

/// 99期货网库存数据
pub const QH99_STOCK_URL: &str = "https://www.99qh.com/data/stockIn";
/// 现货价格数据
pub const SPOT_PRICE_URL: &str = "https://www.100ppi.com/sf";
/// 郑州商品交易所静态文件
pub const CZCE_STATIC_URL: &str = "http://www.czce.com.cn/cn/DFSStaticFiles/Future";
/// 大连商品交易所首页（预访问取 Cookie）
pub const DCE_HOME_URL: &str = "http://www.dce.com.cn/dalianshangpin/xqsj/tjsj26/rtj/rcjccpm/index.html";
/// 大连商品交易所持仓排名批量下载
pub const DCE_VOL_RANK_URL: &str =
    "http://www.dce.com.cn/dcereport/publicweb/dailystat/memberDealPosi/batchDownload";

/// 中金所品种代码
const CFFEX_PRODUCTS: [&str; 8] = ["IF", "IC", "IH", "IM", "TS", "TF", "TL", "T"];

/// 从合约代码中提取品种代码，如 `rb2505` -> `RB`
pub fn extract_variety(symbol: &str) -> String {
    symbol
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase()
}

/// 从合约代码中提取月份，取最后四位数字
pub fn extract_contract_month(contract: &str) -> String {
    let digits: String = contract.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 4 {
        digits[digits.len() - 4..].to_string()
    } else {
        digits
    }
}

/// 判断是否为中金所合约（品种代码完全匹配）
pub fn is_cffex_symbol(symbol: &str) -> bool {
    let variety = extract_variety(symbol);
    CFFEX_PRODUCTS.contains(&variety.as_str())
}

/// 格式化为新浪实时行情代码：中金所 `CFF_`，其余 `nf_`
pub fn format_realtime_code(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();

    if let Some(rest) = upper.strip_prefix("NF_") {
        return format!("nf_{}", rest);
    }
    if upper.starts_with("CFF_") {
        return upper;
    }

    if is_cffex_symbol(&upper) {
        format!("CFF_{}", upper)
    } else {
        format!("nf_{}", upper)
    }
}

/// 去掉新浪实时行情代码前缀
pub fn strip_realtime_prefix(code: &str) -> &str {
    code.strip_prefix("nf_")
        .or_else(|| code.strip_prefix("CFF_"))
        .unwrap_or(code)
}

/// 中文品种名称到英文代码的映射
pub fn chinese_to_english(name: &str) -> Option<&'static str> {
    let result = match name {
        // 上海期货交易所
        "铜" => Some("CU"),
        "螺纹钢" => Some("RB"),
        "锌" => Some("ZN"),
        "铝" => Some("AL"),
        "黄金" => Some("AU"),
        "线材" => Some("WR"),
        "天然橡胶" => Some("RU"),
        "铅" => Some("PB"),
        "白银" => Some("AG"),
        "沥青" | "石油沥青" => Some("BU"),
        "热轧卷板" => Some("HC"),
        "镍" => Some("NI"),
        "锡" => Some("SN"),
        "燃料油" => Some("FU"),
        "不锈钢" => Some("SS"),
        "纸浆" => Some("SP"),
        "氧化铝" => Some("AO"),
        "丁二烯橡胶" => Some("BR"),
        // 大连商品交易所
        "豆一" => Some("A"),
        "豆二" => Some("B"),
        "豆粕" => Some("M"),
        "豆油" => Some("Y"),
        "玉米" => Some("C"),
        "玉米淀粉" => Some("CS"),
        "棕榈油" => Some("P"),
        "鸡蛋" => Some("JD"),
        "聚乙烯" | "LLDPE" => Some("L"),
        "聚氯乙烯" | "PVC" => Some("V"),
        "聚丙烯" | "PP" => Some("PP"),
        "焦炭" => Some("J"),
        "焦煤" => Some("JM"),
        "铁矿石" => Some("I"),
        "乙二醇" => Some("EG"),
        "苯乙烯" => Some("EB"),
        "液化石油气" | "LPG" => Some("PG"),
        "生猪" => Some("LH"),
        // 郑州商品交易所
        "白糖" => Some("SR"),
        "棉花" => Some("CF"),
        "PTA" => Some("TA"),
        "菜籽油" | "菜油" => Some("OI"),
        "菜籽粕" | "菜粕" => Some("RM"),
        "甲醇" => Some("MA"),
        "玻璃" => Some("FG"),
        "动力煤" => Some("ZC"),
        "硅铁" => Some("SF"),
        "锰硅" => Some("SM"),
        "苹果" => Some("AP"),
        "红枣" => Some("CJ"),
        "尿素" => Some("UR"),
        "纯碱" => Some("SA"),
        "短纤" | "涤纶短纤" => Some("PF"),
        "花生" => Some("PK"),
        "菜籽" => Some("RS"),
        "棉纱" => Some("CY"),
        "粳稻" => Some("JR"),
        "晚籼稻" => Some("LR"),
        "早籼稻" => Some("RI"),
        "强麦" => Some("WH"),
        "普麦" => Some("PM"),
        "烧碱" => Some("SH"),
        "对二甲苯" | "PX" => Some("PX"),
        // 上海国际能源交易中心
        "原油" => Some("SC"),
        "20号胶" => Some("NR"),
        "低硫燃料油" => Some("LU"),
        "国际铜" => Some("BC"),
        // 广州期货交易所
        "工业硅" => Some("SI"),
        "碳酸锂" => Some("LC"),
        _ => None,
    };

    if result.is_some() {
        return result;
    }

    // 100ppi 的名称常带后缀，如 "甲醇MA"、"强麦WH"
    [
        ("菜籽油", "OI"),
        ("甲醇", "MA"),
        ("强麦", "WH"),
        ("棉纱", "CY"),
    ]
    .iter()
    .find(|(prefix, _)| name.starts_with(prefix))
    .map(|(_, code)| *code)
}
