use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 评分档位
///
/// 一个评分维度下的离散成绩档位，例如 0 / 5 / 10 分。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/rubric.ts")]
pub struct RubricLevel {
    // 档位分值
    pub score: f64,
    // 档位名称，如 "优秀"
    pub label: String,
    // 档位说明
    pub description: Option<String>,
}

/// 评分维度
///
/// 管理员编写的评分项定义，在评审进行期间不可变；
/// 评审定义引用（而非复制）评分维度。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/rubric.ts")]
pub struct RubricComponent {
    // 唯一 ID
    pub id: i64,
    // 维度名称，如 "实现质量"
    pub name: String,
    // 维度说明
    pub description: Option<String>,
    // 维度满分（创作时必须等于档位分值上限）
    pub max_marks: f64,
    // 档位列表，使用时必须非空
    pub levels: Vec<RubricLevel>,
}

impl RubricComponent {
    /// 档位分值上限
    ///
    /// 评分与钳位一律以该上限为准，`max_marks` 仅在创作时校验一致。
    pub fn level_ceiling(&self) -> f64 {
        self.levels
            .iter()
            .map(|l| l.score)
            .fold(f64::NEG_INFINITY, f64::max)
            .max(0.0)
    }
}
