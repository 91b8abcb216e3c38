use anyhow::Context as _;

use questify_utils::time::now_unix_secs;

use crate::{
    database::Database,
    model::quest::{NewQuest, Quest},
};

#[derive(sqlx::FromRow)]
struct QuestRow {
    id: i64,
    user_id: i64,
    title: String,
    kind: String,
    rank: String,
    notes: Option<String>,
    tags: Vec<String>,
    due_at: Option<String>,
    repeats_rule: Option<String>,
    difficulty: i32,
    is_negative: bool,
    created_at: i64,
}

const QUEST_COLUMNS: &str = "id, user_id, title, kind, rank, notes, tags, due_at, repeats_rule, \
                             difficulty, is_negative, created_at";

/// Quests for a user, newest first.
pub async fn list_quests(db: &Database, user_id: i64) -> anyhow::Result<Vec<Quest>> {
    let query = format!(
        "SELECT {QUEST_COLUMNS} FROM quests WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
    );
    let rows: Vec<QuestRow> = sqlx::query_as(&query)
        .bind(user_id)
        .fetch_all(db.pool())
        .await?;

    rows.into_iter().map(to_quest).collect()
}

pub async fn create_quest(db: &Database, user_id: i64, quest: &NewQuest) -> anyhow::Result<Quest> {
    let created_at = i64::try_from(now_unix_secs()).context("created_at out of i64 range")?;

    let query = format!(
        "INSERT INTO quests (
            user_id, title, kind, rank, notes, tags, due_at, repeats_rule,
            difficulty, is_negative, created_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {QUEST_COLUMNS}"
    );
    let row: QuestRow = sqlx::query_as(&query)
        .bind(user_id)
        .bind(&quest.title)
        .bind(quest.kind.as_str())
        .bind(quest.rank.as_str())
        .bind(quest.notes.as_deref())
        .bind(&quest.tags)
        .bind(quest.due_at.as_deref())
        .bind(quest.repeats_rule.as_deref())
        .bind(quest.difficulty)
        .bind(quest.is_negative)
        .bind(created_at)
        .fetch_one(db.pool())
        .await?;

    to_quest(row)
}

pub async fn delete_quest(db: &Database, user_id: i64, quest_id: i64) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM quests WHERE id = $1 AND user_id = $2")
        .bind(quest_id)
        .bind(user_id)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

fn to_quest(row: QuestRow) -> anyhow::Result<Quest> {
    Ok(Quest {
        id: row.id,
        user_id: row.user_id,
        title: row.title,
        kind: row.kind.parse().context("quest kind row is invalid")?,
        rank: row.rank.parse().context("quest rank row is invalid")?,
        notes: row.notes,
        tags: row.tags,
        due_at: row.due_at,
        repeats_rule: row.repeats_rule,
        difficulty: row.difficulty,
        is_negative: row.is_negative,
        created_at: u64::try_from(row.created_at).context("created_at row out of u64 range")?,
    })
}
