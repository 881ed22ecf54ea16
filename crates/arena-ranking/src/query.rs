//! Ranking projection: derived rank, win rate, titles, and leaderboards.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use arena_core::effective_game_id;
use arena_db::repositories::RankingRepository;

use crate::error::ApiError;

/// Title tier derived from score and activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Title {
    Unranked,
    Participant,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl Title {
    /// Tier for a player's current counters.
    pub fn from_stats(score: i64, matches_played: i32) -> Self {
        match score {
            s if s >= 200 => Title::Diamond,
            s if s >= 150 => Title::Platinum,
            s if s >= 100 => Title::Gold,
            s if s >= 50 => Title::Silver,
            s if s > 0 => Title::Bronze,
            _ if matches_played > 0 => Title::Participant,
            _ => Title::Unranked,
        }
    }

    pub fn level(&self) -> i32 {
        match self {
            Title::Diamond => 5,
            Title::Platinum => 4,
            Title::Gold => 3,
            Title::Silver => 2,
            Title::Bronze | Title::Participant | Title::Unranked => 1,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Title::Unranked => "Unranked",
            Title::Participant => "Participant",
            Title::Bronze => "Bronze",
            Title::Silver => "Silver",
            Title::Gold => "Gold",
            Title::Platinum => "Platinum",
            Title::Diamond => "Diamond",
        }
    }
}

/// A user's ranking view for one game
#[derive(Debug, Serialize, ToSchema)]
pub struct UserRankingResponse {
    pub user_id: Uuid,
    pub game_id: String,
    pub score: i64,
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_drawn: i32,
    pub matches_lost: i32,
    pub win_rate: f64,
    /// 1-based; 0 means unranked.
    pub rank: i64,
    pub tournaments_played: i64,
    pub title: String,
    pub level: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One leaderboard row
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub score: i64,
    pub matches_played: i32,
    pub matches_won: i32,
    pub win_rate: f64,
    pub title: String,
    pub level: i32,
}

/// A leaderboard page
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub game_id: String,
    pub entries: Vec<LeaderboardEntry>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

pub(crate) fn win_rate(matches_won: i32, matches_played: i32) -> f64 {
    if matches_played > 0 {
        f64::from(matches_won) / f64::from(matches_played)
    } else {
        0.0
    }
}

/// Compute a user's ranking view. A user without a score row gets the
/// all-zero unranked projection.
pub async fn get_user_ranking(
    db: &PgPool,
    user_id: Uuid,
    game_id: &str,
) -> Result<UserRankingResponse, ApiError> {
    let game = effective_game_id(game_id);
    let repo = RankingRepository::new(db);

    let score = repo.find_user_score(user_id, game).await?;
    let tournaments_played = repo.count_tournaments_played(user_id, game).await?;

    let (score_points, played, won, drawn, lost, updated_at) = match &score {
        Some(row) => (
            row.score,
            row.matches_played,
            row.matches_won,
            row.matches_drawn,
            row.matches_lost,
            Some(row.updated_at),
        ),
        None => (0, 0, 0, 0, 0, None),
    };

    let rank = if played > 0 || score_points > 0 {
        1 + repo.count_higher_scores(game, score_points).await?
    } else {
        0
    };

    let title = Title::from_stats(score_points, played);
    Ok(UserRankingResponse {
        user_id,
        game_id: game.to_string(),
        score: score_points,
        matches_played: played,
        matches_won: won,
        matches_drawn: drawn,
        matches_lost: lost,
        win_rate: win_rate(won, played),
        rank,
        tournaments_played,
        title: title.display_name().to_string(),
        level: title.level(),
        updated_at,
    })
}

/// Compute a leaderboard page. Only players with at least one recorded
/// match are listed; ranks are dense over the page offset.
pub async fn get_leaderboard(
    db: &PgPool,
    game_id: &str,
    page: u32,
    page_size: u32,
) -> Result<LeaderboardResponse, ApiError> {
    let game = effective_game_id(game_id);
    let repo = RankingRepository::new(db);

    let offset = i64::from((page - 1) * page_size);
    let rows = repo.leaderboard(game, i64::from(page_size), offset).await?;
    let total = repo.leaderboard_total(game).await?;

    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let title = Title::from_stats(row.score, row.matches_played);
            LeaderboardEntry {
                rank: offset + i as i64 + 1,
                user_id: row.user_id,
                score: row.score,
                matches_played: row.matches_played,
                matches_won: row.matches_won,
                win_rate: win_rate(row.matches_won, row.matches_played),
                title: title.display_name().to_string(),
                level: title.level(),
            }
        })
        .collect();

    Ok(LeaderboardResponse {
        game_id: game.to_string(),
        entries,
        total,
        page,
        page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_tiers_follow_the_score_table() {
        assert_eq!(Title::from_stats(250, 40), Title::Diamond);
        assert_eq!(Title::from_stats(200, 40), Title::Diamond);
        assert_eq!(Title::from_stats(199, 40), Title::Platinum);
        assert_eq!(Title::from_stats(150, 40), Title::Platinum);
        assert_eq!(Title::from_stats(100, 40), Title::Gold);
        assert_eq!(Title::from_stats(50, 40), Title::Silver);
        assert_eq!(Title::from_stats(1, 1), Title::Bronze);
    }

    #[test]
    fn scoreless_players_split_on_activity() {
        // Played but never scored: a participant, not unranked.
        assert_eq!(Title::from_stats(0, 3), Title::Participant);
        assert_eq!(Title::from_stats(0, 0), Title::Unranked);
    }

    #[test]
    fn levels_match_tiers() {
        assert_eq!(Title::Diamond.level(), 5);
        assert_eq!(Title::Platinum.level(), 4);
        assert_eq!(Title::Gold.level(), 3);
        assert_eq!(Title::Silver.level(), 2);
        assert_eq!(Title::Bronze.level(), 1);
        assert_eq!(Title::Participant.level(), 1);
        assert_eq!(Title::Unranked.level(), 1);
    }

    #[test]
    fn win_rate_handles_empty_history() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(3, 4), 0.75);
        assert_eq!(win_rate(0, 5), 0.0);
    }
}
