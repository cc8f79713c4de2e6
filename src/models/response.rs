//! 通用 API 响应模型
//!
//! 定义统一的 API 响应格式

use actix_web::HttpResponse;
use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use serde::{Deserialize, Serialize};

/// 获取北京时间（UTC+8），RFC 3339 格式
pub fn get_beijing_time() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 统一 API 响应结构
///
/// 所有接口返回统一格式，包含：
/// - success: 请求是否成功
/// - data: 响应数据（成功时有值）
/// - message: 响应消息
/// - timestamp: 响应时间戳（北京时间）
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 响应数据
    pub data: Option<T>,
    /// 响应消息
    pub message: String,
    /// 响应时间戳（ISO 8601 格式）
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: get_beijing_time(),
        }
    }

    /// 创建错误响应
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
            timestamp: get_beijing_time(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// 数据接口结果转 HTTP 响应：成功 200，失败 500
    pub fn respond(result: anyhow::Result<T>) -> HttpResponse {
        match result {
            Ok(data) => HttpResponse::Ok().json(Self::success(data)),
            Err(e) => {
                log::error!("数据接口调用失败: {:#}", e);
                HttpResponse::InternalServerError().json(Self::error(format!("{:#}", e)))
            }
        }
    }

    /// 参数错误，返回 400
    pub fn bad_request(message: impl Into<String>) -> HttpResponse {
        HttpResponse::BadRequest().json(Self::error(message.into()))
    }
}
