//! EvalSystem - 学术项目评审核心
//!
//! 面向项目评审仪表盘的评审生命周期与成绩录入核心：锁定状态机、
//! PPT 闸门、逐学生/逐维度评分会话与提交构建器。CRUD 表单、
//! Excel 导入导出和推送通道由宿主实现，核心只通过 `api` 模块的
//! 协作方契约消费它们。
//!
//! # 架构
//! - `api`: 外部协作方契约（拉取/写入/修改申请）与读缓存
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `services`: 业务逻辑层（锁定/会话/提交/修改申请/实时总线）
//! - `utils`: 工具函数

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;
