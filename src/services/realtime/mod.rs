/*!
 * 评审状态实时更新总线
 *
 * 推送通道本身（WebSocket 重连/退避/缓存）由宿主实现，核心只
 * 约定两件事：提交成功后把乐观更新推出去，外部状态变化时把
 * 更新应用回本地缓存的团队对象。
 *
 * ## 更新格式
 *
 * ```json
 * {
 *     "review_id": 1,
 *     "team_id": 7,
 *     "marks_entered": true,
 *     "is_unlocked": false,
 *     "request_status": "none"
 * }
 * ```
 */

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use ts_rs::TS;

use crate::models::teams::entities::{RequestStatus, Team};

/// 全局更新总线
static UPDATE_BUS: Lazy<UpdateBus> = Lazy::new(UpdateBus::new);

/// 团队聚合状态更新
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/realtime.ts")]
pub struct TeamStateUpdate {
    pub review_id: i64,
    pub team_id: i64,
    pub marks_entered: bool,
    pub is_unlocked: bool,
    pub request_status: RequestStatus,
}

/// 更新总线
///
/// 按评审教师 ID 维护广播发送器；宿主的通道适配器注册为订阅者，
/// 核心（提交服务）作为发布者。
pub struct UpdateBus {
    // 评审教师 ID -> 广播发送器
    connections: DashMap<i64, broadcast::Sender<TeamStateUpdate>>,
}

impl UpdateBus {
    fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// 获取全局实例
    pub fn get() -> &'static Self {
        &UPDATE_BUS
    }

    /// 注册订阅
    pub fn register(&self, faculty_id: i64) -> broadcast::Receiver<TeamStateUpdate> {
        let entry = self.connections.entry(faculty_id).or_insert_with(|| {
            let (tx, _) = broadcast::channel(100);
            tx
        });
        entry.subscribe()
    }

    /// 注销订阅
    pub fn unregister(&self, faculty_id: i64) {
        // 只有当没有订阅者时才移除
        if let Some(entry) = self.connections.get(&faculty_id)
            && entry.receiver_count() == 0
        {
            drop(entry);
            self.connections.remove(&faculty_id);
        }
    }

    /// 向指定评审教师推送更新
    pub fn send_to_faculty(&self, faculty_id: i64, update: TeamStateUpdate) -> bool {
        if let Some(sender) = self.connections.get(&faculty_id) {
            sender.send(update).is_ok()
        } else {
            debug!("No subscriber registered for faculty {}", faculty_id);
            false
        }
    }

    /// 向所有订阅者推送更新
    pub fn send_to_all(&self, update: TeamStateUpdate) {
        for entry in self.connections.iter() {
            let _ = entry.value().send(update.clone());
        }
    }

    /// 在线订阅数
    pub fn online_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.receiver_count() > 0)
            .count()
    }

    /// 指定评审教师是否有订阅
    pub fn is_registered(&self, faculty_id: i64) -> bool {
        self.connections
            .get(&faculty_id)
            .is_some_and(|s| s.receiver_count() > 0)
    }
}

/// 把外部更新应用到本地缓存的团队对象
///
/// 团队不匹配时不做任何事并返回 false。
pub fn apply_team_update(team: &mut Team, update: &TeamStateUpdate) -> bool {
    if team.id != update.team_id {
        return false;
    }
    team.marks_entered = update.marks_entered;
    team.is_unlocked = update.is_unlocked;
    team.request_status = update.request_status;
    true
}
