// ==========================================
// 联赛赛程恢复引擎 - 领域层
// ==========================================
// 职责: 赛程、规则、距离、赛历、之旅等领域模型
// 红线: 领域层不包含候选生成与建模逻辑
// ==========================================

pub mod calendar;
pub mod distance;
pub mod fixture;
pub mod rules;
pub mod tour;
pub mod types;

// 重导出核心类型
pub use calendar::{BlackoutWindow, LeagueCalendar, RescheduleWindowTable};
pub use distance::DistanceMatrix;
pub use fixture::{DateOverride, Fixture, FixtureRow, Match, MatchId};
pub use rules::LeagueRules;
pub use tour::{Tour, TourKey, TourVariant, VariantKey};
pub use types::{Condition, DistanceMode, Formulation, MatchClass, ObjectiveKind, TeamId};
