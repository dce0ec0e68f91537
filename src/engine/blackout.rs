// ==========================================
// 联赛赛程恢复引擎 - 封锁窗口计算
// ==========================================
// 职责: 从历史延期记录推导各球队封锁窗口
// 输入: 赛程快照（reschedule 标记 + day_difference + game_date）
// 输出: RescheduleWindowTable
// 红线: 窗口锚定历史计划日期，跨轮次结果稳定
// ==========================================

use crate::domain::calendar::{BlackoutWindow, RescheduleWindowTable};
use crate::domain::fixture::{Fixture, FixtureRow};
use chrono::{Duration, NaiveDate};
use tracing::{debug, instrument};

/// 只有单侧边界时窗口的延伸天数
pub const OPEN_WINDOW_DAYS: i64 = 10;

// ==========================================
// BlackoutCalculator - 封锁窗口计算器
// ==========================================
pub struct BlackoutCalculator {
    // 无状态
}

impl BlackoutCalculator {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算全部球队的封锁窗口
    ///
    /// 对每条已观测延期（reschedule=1 且 day_difference>0）：
    /// - prev: 锚点之前最后一场未受影响比赛的 game_date
    /// - next: 锚点之后第一场未受影响比赛的 game_date
    /// - 窗口 [prev+1, next-1]；缺 next 时 [prev+1, prev+10]；缺 prev 时 [next-10, next-1]
    #[instrument(skip(self, fixture), fields(rows = fixture.len()))]
    pub fn compute(&self, fixture: &Fixture) -> RescheduleWindowTable {
        let mut table = RescheduleWindowTable::new();

        for team in fixture.teams() {
            let rows = fixture.team_rows(&team);
            for postponed in rows.iter().filter(|r| r.is_observed_postponement()) {
                if let Some(window) = window_around(&rows, postponed.planned_anchor()) {
                    table.insert(&team, window);
                }
            }
            debug!(
                team = %team,
                windows = table.windows_for(&team).len(),
                "球队封锁窗口计算完成"
            );
        }

        table
    }
}

impl Default for BlackoutCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// 锚点两侧未受影响比赛之间的空档
fn window_around(rows: &[&FixtureRow], anchor: NaiveDate) -> Option<BlackoutWindow> {
    let unaffected = rows.iter().filter(|r| !r.reschedule).map(|r| r.game_date);
    let prev = unaffected.clone().filter(|d| *d < anchor).max();
    let next = unaffected.filter(|d| *d > anchor).min();

    let one = Duration::days(1);
    match (prev, next) {
        (Some(p), Some(n)) => BlackoutWindow::new(p + one, n - one),
        (Some(p), None) => BlackoutWindow::new(p + one, p + Duration::days(OPEN_WINDOW_DAYS)),
        (None, Some(n)) => BlackoutWindow::new(n - Duration::days(OPEN_WINDOW_DAYS), n - one),
        (None, None) => None,
    }
}
