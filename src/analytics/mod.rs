//! 访问统计
//!
//! - `stats`: 日桶 key 推导与 lastDay / lastWeek / allTime 聚合
//! - `pending`: 后台计数任务的在途追踪（用于关闭时排空）

pub mod pending;
pub mod stats;

pub use pending::PendingTasks;
pub use stats::{UsageStats, WEEK_WINDOW_DAYS, day_bucket_key, day_start};
