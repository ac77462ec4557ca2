use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::types::*;

pub const BASE: &str = ""; // use same-origin relative URLs

fn url(path: &str) -> String { format!("{}{}", BASE, path) }

fn map_net(e: reqwasm::Error) -> String { format!("Netzwerkfehler: {}", e) }

async fn error_text(resp: reqwasm::http::Response) -> String {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_else(|_| "HTTP Fehler".into());
    // Backend errors carry a JSON envelope; surface its message when present.
    if let Ok(v) = serde_json::from_str::<JsonValue>(&text) {
        if let Some(msg) = v["error"]["message"].as_str() {
            return format!("{} ({})", msg, status);
        }
    }
    text
}

pub async fn healthz() -> Result<bool, String> {
    let resp = reqwasm::http::Request::get(&url("/healthz")).send().await.map_err(map_net)?;
    Ok(resp.ok())
}

pub async fn get_metrics() -> Result<MetricsSnapshot, String> {
    let resp = reqwasm::http::Request::get(&url("/metrics")).send().await.map_err(map_net)?;
    if !resp.ok() { return Err(error_text(resp).await); }
    resp.json().await.map_err(map_net)
}

pub async fn list_employees(status: Option<&str>) -> Result<Vec<EmployeeDto>, String> {
    let qstr = match status {
        Some(s) => format!("?status={}", urlencoding::encode(s)),
        None => String::new(),
    };
    let resp = reqwasm::http::Request::get(&url(&format!("/register{}", qstr)))
        .send().await.map_err(map_net)?;
    if !resp.ok() { return Err(error_text(resp).await); }
    resp.json().await.map_err(map_net)
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterEmployeeReq {
    pub staff_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub base_salary: String,
    pub hire_date: String,
}

pub async fn register_employee(req: &RegisterEmployeeReq) -> Result<EmployeeDto, String> {
    let resp = reqwasm::http::Request::post(&url("/register"))
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(req).unwrap())
        .send().await.map_err(map_net)?;
    if !resp.ok() { return Err(error_text(resp).await); }
    resp.json().await.map_err(map_net)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PayslipQuery {
    pub employee_id: Option<String>,
    pub run_id: Option<String>,
    pub status: Option<String>,
}

pub async fn list_payslips(q: &PayslipQuery) -> Result<Vec<PayslipDto>, String> {
    let mut qs = vec![];
    if let Some(e) = &q.employee_id { qs.push(format!("employee_id={}", urlencoding::encode(e))); }
    if let Some(r) = &q.run_id { qs.push(format!("run_id={}", urlencoding::encode(r))); }
    if let Some(s) = &q.status { qs.push(format!("status={}", urlencoding::encode(s))); }
    let qstr = if qs.is_empty() { String::new() } else { format!("?{}", qs.join("&")) };
    let resp = reqwasm::http::Request::get(&url(&format!("/payslips{}", qstr)))
        .send().await.map_err(map_net)?;
    if !resp.ok() { return Err(error_text(resp).await); }
    resp.json().await.map_err(map_net)
}
