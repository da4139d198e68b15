use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{EvalSystemError, Result};

/// 全局活动会话表
static ACTIVE_SESSIONS: Lazy<DashMap<(i64, i64), Uuid>> = Lazy::new(DashMap::new);

/// 活动会话登记
///
/// 同一 (评审教师, 团队) 同时只允许一个评分会话；可变评分状态
/// 绝不跨会话共享。
pub struct SessionManager;

impl SessionManager {
    /// 登记一个新会话，已存在时返回冲突错误
    pub fn acquire(evaluator_id: i64, team_id: i64, session_id: Uuid) -> Result<SessionGuard> {
        let key = (evaluator_id, team_id);
        match ACTIVE_SESSIONS.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(EvalSystemError::session_conflict(
                format!("评审教师 {evaluator_id} 已有团队 {team_id} 的活动会话"),
            )),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(session_id);
                debug!(
                    "Session {} registered for evaluator {} / team {}",
                    session_id, evaluator_id, team_id
                );
                Ok(SessionGuard { key, session_id })
            }
        }
    }

    /// 指定 (评审教师, 团队) 是否有活动会话
    pub fn is_active(evaluator_id: i64, team_id: i64) -> bool {
        ACTIVE_SESSIONS.contains_key(&(evaluator_id, team_id))
    }

    /// 活动会话数
    pub fn active_count() -> usize {
        ACTIVE_SESSIONS.len()
    }
}

/// 会话登记凭据
///
/// 随会话一同销毁；Drop 时自动注销登记，提交成功与显式取消
/// 都不需要额外清理。
#[derive(Debug)]
pub struct SessionGuard {
    key: (i64, i64),
    session_id: Uuid,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        ACTIVE_SESSIONS
            .remove_if(&self.key, |_, registered| *registered == self.session_id);
        debug!("Session {} unregistered", self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_session_per_pair() {
        let id = Uuid::new_v4();
        let guard = SessionManager::acquire(9001, 42, id).unwrap();
        assert!(SessionManager::is_active(9001, 42));

        // 同一对 (评审教师, 团队) 的第二个会话被拒绝
        assert!(SessionManager::acquire(9001, 42, Uuid::new_v4()).is_err());

        // 其他团队不受影响
        let other = SessionManager::acquire(9001, 43, Uuid::new_v4()).unwrap();

        drop(guard);
        assert!(!SessionManager::is_active(9001, 42));
        // 释放后可重新登记
        let _again = SessionManager::acquire(9001, 42, Uuid::new_v4()).unwrap();
        drop(other);
    }
}
