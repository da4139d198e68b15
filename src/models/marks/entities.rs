use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::reviews::entities::FacultyType;

/// 单个维度的得分
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct ComponentMark {
    pub component_id: i64,
    pub component_name: String,
    // 原始档位分值（缺席/PAT 学生为 0）
    pub marks: f64,
    pub max_marks: f64,
}

/// 成绩记录
///
/// 每个学生每次评审一条，提交后不可变。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct MarkRecord {
    pub student_id: i64,
    // 项目（团队）ID
    pub project_id: i64,
    pub review_id: i64,
    pub faculty_type: FacultyType,
    pub component_marks: Vec<ComponentMark>,
    pub total_marks: f64,
    pub max_total_marks: f64,
    // 备注：缺席/PAT 标签前缀 + 个人评语 + 团队反馈/PPT 批准后缀
    // （格式见 utils::remarks，系统其他部分依赖该格式做解析）
    pub remarks: String,
    pub is_submitted: bool,
}
