//! Dashboard aggregations over the gig list
//!
//! Everything here is a single pass over an in-memory slice of gigs:
//! earnings per month, per-skill performance with a demand score, and a
//! recent-activity summary. The async entry points only load the gigs.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::gigs::list_gigs;
use super::present;
use crate::error::ApiError;
use crate::models::{Gig, GigStatus};
use crate::store::Records;

/// Highest possible demand score
const MAX_DEMAND_SCORE: usize = 10;
/// Number of gigs listed under recent activity
const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEarnings {
    /// `YYYY-MM`
    pub month: String,
    /// `Mon YYYY`, e.g. `Mar 2024`
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
    pub total_earnings: f64,
    pub completed_gigs: usize,
    pub average_earnings: f64,
    pub monthly: Vec<MonthlyEarnings>,
    pub gigs: Vec<Gig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMetric {
    pub skill: String,
    pub count: usize,
    pub earnings: f64,
    pub average_earnings: f64,
    pub demand_score: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Percentage of assigned gigs that were completed
    pub completion_rate: f64,
    pub completed_gigs: usize,
    pub skills: Vec<SkillMetric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityRole {
    Created,
    Assigned,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub gig: Gig,
    pub role: ActivityRole,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub created_gigs: usize,
    pub completed_gigs: usize,
    pub in_progress_gigs: usize,
    pub recent: Vec<ActivityEntry>,
    pub skills: Vec<String>,
}

#[allow(clippy::cast_precision_loss)]
fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Sum payouts by calendar month (UTC) of completion, oldest month first
///
/// Gigs without a completion time are skipped.
pub fn monthly_earnings<'a>(completed: impl IntoIterator<Item = &'a Gig>) -> Vec<MonthlyEarnings> {
    let mut by_month: BTreeMap<String, (String, f64)> = BTreeMap::new();
    for gig in completed {
        let Some(completed_at) = gig.completed_at else {
            continue;
        };
        let entry = by_month
            .entry(completed_at.format("%Y-%m").to_string())
            .or_insert_with(|| (completed_at.format("%b %Y").to_string(), 0.0));
        entry.1 += gig.payout_amount;
    }

    by_month
        .into_iter()
        .map(|(month, (label, amount))| MonthlyEarnings {
            month,
            label,
            amount,
        })
        .collect()
}

/// `min(10, ceil(demand * 10 / max(1, open_gigs)))`
pub fn demand_score(demand: usize, open_gigs: usize) -> usize {
    (demand * MAX_DEMAND_SCORE)
        .div_ceil(open_gigs.max(1))
        .min(MAX_DEMAND_SCORE)
}

pub fn earnings_summary(gigs: &[Gig], user_id: &str) -> EarningsSummary {
    let completed: Vec<Gig> = gigs
        .iter()
        .filter(|g| g.is_completed_by(user_id))
        .cloned()
        .collect();
    let total_earnings: f64 = completed.iter().map(|g| g.payout_amount).sum();

    EarningsSummary {
        total_earnings,
        completed_gigs: completed.len(),
        average_earnings: average(total_earnings, completed.len()),
        monthly: monthly_earnings(&completed),
        gigs: completed,
    }
}

/// Per-skill earnings for the user's completed gigs, highest earnings first
#[allow(clippy::cast_precision_loss)]
pub fn performance_metrics(gigs: &[Gig], user_id: &str) -> PerformanceMetrics {
    let completed: Vec<&Gig> = gigs.iter().filter(|g| g.is_completed_by(user_id)).collect();

    let mut per_skill: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for gig in &completed {
        for skill in &gig.skills_required {
            let entry = per_skill.entry(skill.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += gig.payout_amount;
        }
    }

    let open: Vec<&Gig> = gigs.iter().filter(|g| g.status == GigStatus::Open).collect();
    let mut demand: HashMap<&str, usize> = HashMap::new();
    for gig in &open {
        for skill in &gig.skills_required {
            *demand.entry(skill.as_str()).or_insert(0) += 1;
        }
    }

    let mut skills: Vec<SkillMetric> = per_skill
        .into_iter()
        .map(|(skill, (count, earnings))| SkillMetric {
            skill: skill.to_string(),
            count,
            earnings,
            average_earnings: average(earnings, count),
            demand_score: demand_score(demand.get(skill).copied().unwrap_or(0), open.len()),
        })
        .collect();
    skills.sort_by(|a, b| b.earnings.total_cmp(&a.earnings));

    let assigned = gigs.iter().filter(|g| g.is_assigned_to(user_id)).count();
    let completion_rate = average(100.0 * completed.len() as f64, assigned);

    PerformanceMetrics {
        completion_rate,
        completed_gigs: completed.len(),
        skills,
    }
}

/// Counts and recent gigs the user posted or was assigned
pub fn activity_summary(gigs: &[Gig], user_id: &str) -> ActivitySummary {
    let mut involved: Vec<&Gig> = gigs
        .iter()
        .filter(|g| g.posted_by_user_id == user_id || g.is_assigned_to(user_id))
        .collect();

    let created_gigs = involved
        .iter()
        .filter(|g| g.posted_by_user_id == user_id)
        .count();
    let completed_gigs = involved.iter().filter(|g| g.is_completed_by(user_id)).count();
    let in_progress_gigs = involved
        .iter()
        .filter(|g| g.is_assigned_to(user_id) && g.status == GigStatus::InProgress)
        .count();

    let mut skills: Vec<String> = Vec::new();
    for gig in &involved {
        for skill in &gig.skills_required {
            if !skills.contains(skill) {
                skills.push(skill.clone());
            }
        }
    }

    involved.sort_by_key(|g| std::cmp::Reverse(g.last_activity()));
    let recent = involved
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|gig| ActivityEntry {
            role: if gig.posted_by_user_id == user_id {
                ActivityRole::Created
            } else {
                ActivityRole::Assigned
            },
            gig: gig.clone(),
        })
        .collect();

    ActivitySummary {
        created_gigs,
        completed_gigs,
        in_progress_gigs,
        recent,
        skills,
    }
}

async fn load_for_user(
    records: &Records,
    user_id: Option<String>,
) -> Result<(Vec<Gig>, String), ApiError> {
    let user_id = present(user_id).ok_or_else(|| ApiError::bad_request("userId required"))?;
    let gigs = list_gigs(records, None).await?;
    Ok((gigs, user_id))
}

pub async fn earnings(records: &Records, user_id: Option<String>) -> Result<EarningsSummary, ApiError> {
    let (gigs, user_id) = load_for_user(records, user_id).await?;
    Ok(earnings_summary(&gigs, &user_id))
}

pub async fn performance(
    records: &Records,
    user_id: Option<String>,
) -> Result<PerformanceMetrics, ApiError> {
    let (gigs, user_id) = load_for_user(records, user_id).await?;
    Ok(performance_metrics(&gigs, &user_id))
}

pub async fn activity(records: &Records, user_id: Option<String>) -> Result<ActivitySummary, ApiError> {
    let (gigs, user_id) = load_for_user(records, user_id).await?;
    Ok(activity_summary(&gigs, &user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn gig(id: &str, skills: &[&str], payout: f64, status: GigStatus) -> Gig {
        Gig {
            gig_id: id.to_string(),
            title: format!("gig {id}"),
            description: String::new(),
            skills_required: skills.iter().map(ToString::to_string).collect(),
            payout_amount: payout,
            status,
            posted_by_user_id: "poster".to_string(),
            completed_by_user_id: None,
            created_at: at(2024, 1, 1),
            updated_at: None,
            completed_at: None,
        }
    }

    fn done(id: &str, skills: &[&str], payout: f64, when: DateTime<Utc>) -> Gig {
        Gig {
            completed_by_user_id: Some("worker".to_string()),
            completed_at: Some(when),
            ..gig(id, skills, payout, GigStatus::Completed)
        }
    }

    #[test]
    fn test_demand_score() {
        assert_eq!(demand_score(0, 0), 0);
        assert_eq!(demand_score(0, 5), 0);
        assert_eq!(demand_score(1, 3), 4); // ceil(10/3)
        assert_eq!(demand_score(3, 3), 10);
        assert_eq!(demand_score(2, 0), 10); // clamped
    }

    #[test]
    fn test_monthly_earnings_grouped_and_sorted() {
        let gigs = vec![
            done("a", &[], 30.0, at(2024, 3, 5)),
            done("b", &[], 20.0, at(2024, 1, 20)),
            done("c", &[], 5.0, at(2024, 3, 28)),
            Gig {
                completed_at: None,
                ..done("d", &[], 99.0, at(2024, 2, 1))
            },
        ];
        let monthly = monthly_earnings(&gigs);
        assert_eq!(
            monthly,
            vec![
                MonthlyEarnings {
                    month: "2024-01".into(),
                    label: "Jan 2024".into(),
                    amount: 20.0
                },
                MonthlyEarnings {
                    month: "2024-03".into(),
                    label: "Mar 2024".into(),
                    amount: 35.0
                },
            ]
        );
    }

    #[test]
    fn test_earnings_summary_only_counts_own_completed() {
        let gigs = vec![
            done("a", &[], 40.0, at(2024, 2, 1)),
            done("b", &[], 60.0, at(2024, 2, 9)),
            Gig {
                completed_by_user_id: Some("worker".into()),
                ..gig("c", &[], 500.0, GigStatus::InProgress)
            },
            Gig {
                completed_by_user_id: Some("someone".into()),
                ..done("d", &[], 1000.0, at(2024, 2, 1))
            },
        ];
        let summary = earnings_summary(&gigs, "worker");
        assert_eq!(summary.completed_gigs, 2);
        assert!((summary.total_earnings - 100.0).abs() < 1e-9);
        assert!((summary.average_earnings - 50.0).abs() < 1e-9);
        assert_eq!(summary.monthly.len(), 1);

        let empty = earnings_summary(&gigs, "nobody");
        assert_eq!(empty.completed_gigs, 0);
        assert!(empty.average_earnings.abs() < f64::EPSILON);
    }

    #[test]
    fn test_performance_metrics() {
        let gigs = vec![
            done("a", &["rust", "sql"], 100.0, at(2024, 1, 1)),
            done("b", &["design"], 300.0, at(2024, 1, 2)),
            Gig {
                completed_by_user_id: Some("worker".into()),
                ..gig("c", &["rust"], 10.0, GigStatus::InProgress)
            },
            gig("o1", &["rust"], 10.0, GigStatus::Open),
            gig("o2", &["rust", "design"], 10.0, GigStatus::Open),
            gig("o3", &[], 10.0, GigStatus::Open),
        ];
        let metrics = performance_metrics(&gigs, "worker");

        assert_eq!(metrics.completed_gigs, 2);
        // 2 completed out of 3 assigned
        assert!((metrics.completion_rate - 200.0 / 3.0).abs() < 1e-9);

        let names: Vec<&str> = metrics.skills.iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(names[0], "design");
        let rust = metrics.skills.iter().find(|s| s.skill == "rust").unwrap();
        assert_eq!(rust.count, 1);
        assert_eq!(rust.demand_score, 7); // ceil(2 * 10 / 3)
        let sql = metrics.skills.iter().find(|s| s.skill == "sql").unwrap();
        assert_eq!(sql.demand_score, 0);
    }

    #[test]
    fn test_activity_summary() {
        let mut gigs = Vec::new();
        for i in 0..4u32 {
            gigs.push(Gig {
                posted_by_user_id: "me".into(),
                created_at: at(2024, 1, i + 1),
                ..gig(&format!("p{i}"), &["rust"], 1.0, GigStatus::Open)
            });
        }
        gigs.push(Gig {
            completed_by_user_id: Some("me".into()),
            updated_at: Some(at(2024, 6, 1)),
            ..gig("w1", &["design"], 1.0, GigStatus::InProgress)
        });
        gigs.push(Gig {
            completed_by_user_id: Some("me".into()),
            completed_at: Some(at(2024, 5, 1)),
            updated_at: Some(at(2024, 5, 1)),
            ..gig("w2", &["rust", "writing"], 1.0, GigStatus::Completed)
        });
        gigs.push(gig("other", &["cooking"], 1.0, GigStatus::Open));

        let summary = activity_summary(&gigs, "me");
        assert_eq!(summary.created_gigs, 4);
        assert_eq!(summary.completed_gigs, 1);
        assert_eq!(summary.in_progress_gigs, 1);
        assert_eq!(summary.skills, vec!["rust", "design", "writing"]);

        assert_eq!(summary.recent.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(summary.recent[0].gig.gig_id, "w1");
        assert_eq!(summary.recent[0].role, ActivityRole::Assigned);
        assert_eq!(summary.recent[2].gig.gig_id, "p3");
        assert_eq!(summary.recent[2].role, ActivityRole::Created);
    }
}
