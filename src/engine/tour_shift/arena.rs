use crate::domain::fixture::MatchId;
use crate::domain::tour::{TourKey, TourVariant, VariantKey};
use crate::domain::types::TeamId;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 变体在 arena 中的下标
pub type VariantId = usize;

// ==========================================
// VariantArena - 变体存储与二级索引
// ==========================================
// 变体只存一份，索引仅保存下标
#[derive(Debug, Default)]
pub struct VariantArena {
    variants: Vec<TourVariant>,
    by_key: HashMap<VariantKey, VariantId>,
    by_team_date: BTreeMap<(TeamId, NaiveDate), Vec<VariantId>>,
    by_tour: BTreeMap<TourKey, Vec<VariantId>>,
    by_match: BTreeMap<MatchId, Vec<VariantId>>,
}

impl VariantArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// 存入变体；相同 (之旅, 分配) 的变体只保留第一份
    ///
    /// # 返回
    /// (下标, 是否为新变体)
    pub fn push(&mut self, variant: TourVariant) -> (VariantId, bool) {
        let key = variant.key();
        if let Some(&id) = self.by_key.get(&key) {
            return (id, false);
        }

        let id = self.variants.len();

        // 主客双方都要登记，密度规则同时约束两侧
        let mut team_dates = BTreeSet::new();
        for m in &variant.new_sequence {
            team_dates.insert((m.home.clone(), m.proposed_date));
            team_dates.insert((m.away.clone(), m.proposed_date));
            self.by_match.entry(m.id()).or_default().push(id);
        }
        for team_date in team_dates {
            self.by_team_date.entry(team_date).or_default().push(id);
        }
        self.by_tour.entry(variant.tour.clone()).or_default().push(id);

        self.by_key.insert(key, id);
        self.variants.push(variant);
        (id, true)
    }

    pub fn get(&self, id: VariantId) -> Option<&TourVariant> {
        self.variants.get(id)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariantId, &TourVariant)> {
        self.variants.iter().enumerate()
    }

    pub fn variants_for_tour(&self, tour: &TourKey) -> &[VariantId] {
        self.by_tour.get(tour).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn variants_for_team_date(&self, team: &str, date: NaiveDate) -> &[VariantId] {
        self.by_team_date
            .get(&(team.to_string(), date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 包含该比赛的全部变体
    pub fn variants_containing(&self, id: &MatchId) -> &[VariantId] {
        self.by_match.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 全部之旅（有序）
    pub fn tours(&self) -> impl Iterator<Item = (&TourKey, &[VariantId])> {
        self.by_tour.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// 全部 (球队, 日期) 索引项（有序）
    pub fn team_dates(&self) -> impl Iterator<Item = (&(TeamId, NaiveDate), &[VariantId])> {
        self.by_team_date.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// 某球队各之旅的变体下标
    pub fn team_tours(&self, team: &str) -> Vec<(&TourKey, &[VariantId])> {
        self.tours().filter(|(k, _)| k.team() == team).collect()
    }

    /// 被变体覆盖的全部比赛
    pub fn covered_matches(&self) -> impl Iterator<Item = &MatchId> {
        self.by_match.keys()
    }
}
