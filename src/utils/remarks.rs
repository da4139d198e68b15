//! 成绩备注编码
//!
//! 备注字符串把缺席/PAT 标记、个人评语、团队反馈和 PPT 批准
//! 压进一个字段，段落顺序固定：
//!
//! ```text
//! [ABSENT] [PAT] <个人评语> | Team: <团队反馈> | PPT Approved
//! ```
//!
//! 系统其他部分（报表、历史展示）按该顺序解析，构建与解析必须
//! 保持往返一致。

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\[ABSENT\])?\s*(\[PAT\])?\s*").expect("Invalid tag regex"));

const TEAM_SEP: &str = "| Team: ";
const PPT_SUFFIX: &str = "| PPT Approved";

/// 备注的结构化表示
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemarkParts {
    pub absent: bool,
    pub pat: bool,
    pub personal: String,
    pub team_feedback: String,
    pub ppt_approved: bool,
}

/// 构建备注字符串
///
/// 顺序：缺席/PAT 标签前缀、个人评语、团队反馈后缀、PPT 批准后缀。
pub fn build_remarks(parts: &RemarkParts) -> String {
    let mut head = String::new();
    if parts.absent {
        head.push_str("[ABSENT]");
    }
    if parts.pat {
        if !head.is_empty() {
            head.push(' ');
        }
        head.push_str("[PAT]");
    }
    let personal = parts.personal.trim();
    if !personal.is_empty() {
        if !head.is_empty() {
            head.push(' ');
        }
        head.push_str(personal);
    }

    let mut segments = vec![head];
    let team = parts.team_feedback.trim();
    if !team.is_empty() {
        segments.push(format!("Team: {team}"));
    }
    if parts.ppt_approved {
        segments.push("PPT Approved".to_string());
    }
    segments.join(" | ").trim().to_string()
}

/// 解析备注字符串
pub fn parse_remarks(remarks: &str) -> RemarkParts {
    let mut rest = remarks.trim();

    let ppt_approved = if let Some(stripped) = rest.strip_suffix(PPT_SUFFIX) {
        rest = stripped.trim_end();
        true
    } else {
        false
    };

    let team_feedback = match rest.find(TEAM_SEP) {
        Some(idx) => {
            let team = rest[idx + TEAM_SEP.len()..].trim().to_string();
            rest = rest[..idx].trim_end();
            team
        }
        None => String::new(),
    };

    let (absent, pat, personal) = match TAG_RE.captures(rest) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            (
                caps.get(1).is_some(),
                caps.get(2).is_some(),
                rest[end..].trim().to_string(),
            )
        }
        None => (false, false, rest.trim().to_string()),
    };

    RemarkParts {
        absent,
        pat,
        personal,
        team_feedback,
        ppt_approved,
    }
}
