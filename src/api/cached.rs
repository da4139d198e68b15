use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::api::{EvaluationApi, ReviewBundle, ReviewFilter};
use crate::config::CacheConfig;
use crate::errors::Result;
use crate::models::common::response::ApiAck;
use crate::models::marks::entities::MarkRecord;
use crate::models::marks::requests::EditRequestPayload;
use crate::models::marks::responses::MarkAck;

/// 评审列表读缓存
///
/// 包装任意 `EvaluationApi`：拉取结果按筛选条件缓存，写操作
/// （成绩提交、修改申请）会使缓存整体失效，避免陈旧的团队状态。
pub struct CachedEvaluationApi {
    inner: Arc<dyn EvaluationApi>,
    fetch_cache: Cache<String, Vec<ReviewBundle>>,
}

impl CachedEvaluationApi {
    pub fn new(inner: Arc<dyn EvaluationApi>, config: &CacheConfig) -> Self {
        let fetch_cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(std::time::Duration::from_secs(config.default_ttl))
            .build();

        debug!(
            "CachedEvaluationApi initialized with max capacity: {}",
            config.max_capacity
        );
        Self { inner, fetch_cache }
    }

    /// 外部状态变化（实时通道推送）后由宿主调用
    pub async fn invalidate(&self) {
        self.fetch_cache.invalidate_all();
    }
}

#[async_trait]
impl EvaluationApi for CachedEvaluationApi {
    async fn fetch_reviews(&self, filter: &ReviewFilter) -> Result<Vec<ReviewBundle>> {
        let key = filter.cache_key();
        if let Some(bundles) = self.fetch_cache.get(&key).await {
            debug!("Review list cache hit: {}", key);
            return Ok(bundles);
        }

        debug!("Review list cache miss: {}", key);
        let bundles = self.inner.fetch_reviews(filter).await?;
        self.fetch_cache.insert(key, bundles.clone()).await;
        Ok(bundles)
    }

    async fn submit_student_mark(&self, record: &MarkRecord) -> Result<MarkAck> {
        let ack = self.inner.submit_student_mark(record).await?;
        // 写入成功后团队聚合状态已变，丢弃缓存
        self.fetch_cache.invalidate_all();
        Ok(ack)
    }

    async fn submit_edit_request(&self, payload: &EditRequestPayload) -> Result<ApiAck> {
        let ack = self.inner.submit_edit_request(payload).await?;
        self.fetch_cache.invalidate_all();
        Ok(ack)
    }
}
