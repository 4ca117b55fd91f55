//! # df-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `df-core` domain models. Document-shaped fields (vote
//! sets, tags, moderator lists, rules) are stored as JSON text columns and
//! queried through `json_each`.

use async_trait::async_trait;
use df_core::models::{Answer, Comment, Community, Question, User, Vote};
use df_core::traits::{ForumRepo, QuestionQuery, QuestionSort};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

pub struct SqliteForumRepo {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

fn opt_uuid_to_blob(id: Option<Uuid>) -> Option<Vec<u8>> {
    id.map(uuid_to_blob)
}

fn json_column<T: serde::de::DeserializeOwned + Default>(row: &SqliteRow, name: &str) -> T {
    serde_json::from_str(&row.get::<String, _>(name)).unwrap_or_default()
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            BLOB PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    reputation    INTEGER NOT NULL DEFAULT 0,
    bio           TEXT NOT NULL DEFAULT '',
    avatar        TEXT NOT NULL DEFAULT '',
    is_admin      BOOLEAN NOT NULL DEFAULT 0,
    created_at    TIMESTAMP NOT NULL
);
CREATE TABLE IF NOT EXISTS questions (
    id                 BLOB PRIMARY KEY,
    title              TEXT NOT NULL,
    body               TEXT NOT NULL,
    author_id          BLOB NOT NULL,
    tags               TEXT NOT NULL DEFAULT '[]',
    votes              TEXT NOT NULL DEFAULT '[]',
    answer_ids         TEXT NOT NULL DEFAULT '[]',
    views              INTEGER NOT NULL DEFAULT 0,
    is_answered        BOOLEAN NOT NULL DEFAULT 0,
    selected_answer_id BLOB,
    created_at         TIMESTAMP NOT NULL
);
CREATE TABLE IF NOT EXISTS answers (
    id          BLOB PRIMARY KEY,
    body        TEXT NOT NULL,
    question_id BLOB NOT NULL,
    author_id   BLOB NOT NULL,
    votes       TEXT NOT NULL DEFAULT '[]',
    comment_ids TEXT NOT NULL DEFAULT '[]',
    is_accepted BOOLEAN NOT NULL DEFAULT 0,
    created_at  TIMESTAMP NOT NULL
);
CREATE TABLE IF NOT EXISTS comments (
    id         BLOB PRIMARY KEY,
    body       TEXT NOT NULL,
    author_id  BLOB NOT NULL,
    answer_id  BLOB NOT NULL,
    created_at TIMESTAMP NOT NULL
);
CREATE TABLE IF NOT EXISTS communities (
    id           BLOB PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    created_by   BLOB NOT NULL,
    moderators   TEXT NOT NULL DEFAULT '[]',
    member_count INTEGER NOT NULL DEFAULT 0,
    post_count   INTEGER NOT NULL DEFAULT 0,
    is_public    BOOLEAN NOT NULL DEFAULT 1,
    rules        TEXT NOT NULL DEFAULT '[]',
    created_at   TIMESTAMP NOT NULL
);
"#;

impl SqliteForumRepo {
    /// Opens (or creates) the database and applies the schema.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        // A single connection keeps in-memory test databases alive and
        // matches the single-writer-per-request model.
        let max_connections = if url.contains(":memory:") { 1 } else { 8 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&pool).await?;
        }
        log::debug!("sqlite schema ready at {url}");
        Ok(Self { pool })
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        reputation: row.get("reputation"),
        bio: row.get("bio"),
        avatar: row.get("avatar"),
        is_admin: row.get("is_admin"),
        created_at: row.get("created_at"),
    }
}

fn question_from_row(row: &SqliteRow) -> Question {
    Question {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        title: row.get("title"),
        body: row.get("body"),
        author_id: blob_to_uuid(row.get::<Vec<u8>, _>("author_id").as_slice()),
        tags: json_column(row, "tags"),
        votes: json_column::<Vec<Vote>>(row, "votes"),
        answer_ids: json_column(row, "answer_ids"),
        views: row.get("views"),
        is_answered: row.get("is_answered"),
        selected_answer_id: row
            .get::<Option<Vec<u8>>, _>("selected_answer_id")
            .map(|b| blob_to_uuid(b.as_slice())),
        created_at: row.get("created_at"),
    }
}

fn answer_from_row(row: &SqliteRow) -> Answer {
    Answer {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        body: row.get("body"),
        question_id: blob_to_uuid(row.get::<Vec<u8>, _>("question_id").as_slice()),
        author_id: blob_to_uuid(row.get::<Vec<u8>, _>("author_id").as_slice()),
        votes: json_column::<Vec<Vote>>(row, "votes"),
        comment_ids: json_column(row, "comment_ids"),
        is_accepted: row.get("is_accepted"),
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &SqliteRow) -> Comment {
    Comment {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        body: row.get("body"),
        author_id: blob_to_uuid(row.get::<Vec<u8>, _>("author_id").as_slice()),
        answer_id: blob_to_uuid(row.get::<Vec<u8>, _>("answer_id").as_slice()),
        created_at: row.get("created_at"),
    }
}

fn community_from_row(row: &SqliteRow) -> Community {
    Community {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        name: row.get("name"),
        display_name: row.get("display_name"),
        description: row.get("description"),
        created_by: blob_to_uuid(row.get::<Vec<u8>, _>("created_by").as_slice()),
        moderators: json_column(row, "moderators"),
        member_count: row.get("member_count"),
        post_count: row.get("post_count"),
        is_public: row.get("is_public"),
        rules: json_column(row, "rules"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ForumRepo for SqliteForumRepo {
    async fn create_user(&self, user: User) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, reputation, bio, avatar, is_admin, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(user.id))
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.reputation)
        .bind(user.bio)
        .bind(user.avatar)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| user_from_row(&r)))
    }

    async fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| user_from_row(&r)))
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| user_from_row(&r)))
    }

    async fn update_user(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET username = ?, email = ?, password_hash = ?, reputation = ?, bio = ?, avatar = ?, is_admin = ? WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.reputation)
        .bind(&user.bio)
        .bind(&user.avatar)
        .bind(user.is_admin)
        .bind(uuid_to_blob(user.id))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_question(&self, question: Question) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO questions (id, title, body, author_id, tags, votes, answer_ids, views, is_answered, selected_answer_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(question.id))
        .bind(question.title)
        .bind(question.body)
        .bind(uuid_to_blob(question.author_id))
        .bind(serde_json::to_string(&question.tags)?)
        .bind(serde_json::to_string(&question.votes)?)
        .bind(serde_json::to_string(&question.answer_ids)?)
        .bind(question.views)
        .bind(question.is_answered)
        .bind(opt_uuid_to_blob(question.selected_answer_id))
        .bind(question.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_question(&self, id: Uuid) -> anyhow::Result<Option<Question>> {
        let row = sqlx::query("SELECT * FROM questions WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| question_from_row(&r)))
    }

    async fn update_question(&self, question: &Question) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE questions SET title = ?, body = ?, tags = ?, votes = ?, answer_ids = ?, views = ?, is_answered = ?, selected_answer_id = ? WHERE id = ?",
        )
        .bind(&question.title)
        .bind(&question.body)
        .bind(serde_json::to_string(&question.tags)?)
        .bind(serde_json::to_string(&question.votes)?)
        .bind(serde_json::to_string(&question.answer_ids)?)
        .bind(question.views)
        .bind(question.is_answered)
        .bind(opt_uuid_to_blob(question.selected_answer_id))
        .bind(uuid_to_blob(question.id))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_question(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_questions(&self, query: &QuestionQuery) -> anyhow::Result<Vec<Question>> {
        let mut sql = String::from("SELECT * FROM questions");
        let mut clauses: Vec<&str> = Vec::new();
        if query.search.is_some() {
            clauses.push("(title LIKE ? OR body LIKE ?)");
        }
        if query.tag.is_some() {
            clauses.push("EXISTS (SELECT 1 FROM json_each(questions.tags) WHERE json_each.value = ?)");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(match query.sort {
            QuestionSort::Newest => " ORDER BY created_at DESC",
            QuestionSort::Oldest => " ORDER BY created_at ASC",
            QuestionSort::MostViewed => " ORDER BY views DESC",
        });
        sql.push_str(" LIMIT ? OFFSET ?");

        let mut stmt = sqlx::query(&sql);
        if let Some(search) = &query.search {
            let pattern = format!("%{search}%");
            stmt = stmt.bind(pattern.clone()).bind(pattern);
        }
        if let Some(tag) = &query.tag {
            stmt = stmt.bind(tag.clone());
        }
        let rows = stmt
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(question_from_row).collect())
    }

    async fn count_questions(&self, query: &QuestionQuery) -> anyhow::Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS n FROM questions");
        let mut clauses: Vec<&str> = Vec::new();
        if query.search.is_some() {
            clauses.push("(title LIKE ? OR body LIKE ?)");
        }
        if query.tag.is_some() {
            clauses.push("EXISTS (SELECT 1 FROM json_each(questions.tags) WHERE json_each.value = ?)");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut stmt = sqlx::query(&sql);
        if let Some(search) = &query.search {
            let pattern = format!("%{search}%");
            stmt = stmt.bind(pattern.clone()).bind(pattern);
        }
        if let Some(tag) = &query.tag {
            stmt = stmt.bind(tag.clone());
        }
        let row = stmt.fetch_one(&self.pool).await?;
        Ok(row.get("n"))
    }

    async fn questions_by_author(&self, author_id: Uuid, limit: i64, offset: i64) -> anyhow::Result<Vec<Question>> {
        let rows = sqlx::query(
            "SELECT * FROM questions WHERE author_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(uuid_to_blob(author_id))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(question_from_row).collect())
    }

    async fn count_questions_by_author(&self, author_id: Uuid) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM questions WHERE author_id = ?")
            .bind(uuid_to_blob(author_id))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    async fn count_questions_with_tag(&self, tag: &str) -> anyhow::Result<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM questions
             WHERE EXISTS (SELECT 1 FROM json_each(questions.tags) WHERE json_each.value = ?)",
        )
        .bind(tag)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("n"))
    }

    async fn tag_counts(&self, limit: i64) -> anyhow::Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT json_each.value AS tag, COUNT(*) AS n
             FROM questions, json_each(questions.tags)
             GROUP BY json_each.value
             ORDER BY n DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|r| (r.get("tag"), r.get("n"))).collect())
    }

    async fn create_answer(&self, answer: Answer) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO answers (id, body, question_id, author_id, votes, comment_ids, is_accepted, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(answer.id))
        .bind(answer.body)
        .bind(uuid_to_blob(answer.question_id))
        .bind(uuid_to_blob(answer.author_id))
        .bind(serde_json::to_string(&answer.votes)?)
        .bind(serde_json::to_string(&answer.comment_ids)?)
        .bind(answer.is_accepted)
        .bind(answer.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_answer(&self, id: Uuid) -> anyhow::Result<Option<Answer>> {
        let row = sqlx::query("SELECT * FROM answers WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| answer_from_row(&r)))
    }

    async fn update_answer(&self, answer: &Answer) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE answers SET body = ?, votes = ?, comment_ids = ?, is_accepted = ? WHERE id = ?",
        )
        .bind(&answer.body)
        .bind(serde_json::to_string(&answer.votes)?)
        .bind(serde_json::to_string(&answer.comment_ids)?)
        .bind(answer.is_accepted)
        .bind(uuid_to_blob(answer.id))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_answer(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM answers WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn answers_for_question(&self, question_id: Uuid) -> anyhow::Result<Vec<Answer>> {
        let rows = sqlx::query("SELECT * FROM answers WHERE question_id = ? ORDER BY created_at ASC")
            .bind(uuid_to_blob(question_id))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(answer_from_row).collect())
    }

    async fn delete_answers_for_question(&self, question_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM answers WHERE question_id = ?")
            .bind(uuid_to_blob(question_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn answers_by_author(&self, author_id: Uuid, limit: i64, offset: i64) -> anyhow::Result<Vec<Answer>> {
        let rows = sqlx::query(
            "SELECT * FROM answers WHERE author_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(uuid_to_blob(author_id))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(answer_from_row).collect())
    }

    async fn count_answers_by_author(&self, author_id: Uuid) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM answers WHERE author_id = ?")
            .bind(uuid_to_blob(author_id))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// One statement, so exclusivity can't be half-applied by this step.
    async fn unaccept_other_answers(&self, question_id: Uuid, except: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE answers SET is_accepted = 0 WHERE question_id = ? AND id != ?")
            .bind(uuid_to_blob(question_id))
            .bind(uuid_to_blob(except))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_comment(&self, comment: Comment) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO comments (id, body, author_id, answer_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(comment.id))
        .bind(comment.body)
        .bind(uuid_to_blob(comment.author_id))
        .bind(uuid_to_blob(comment.answer_id))
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_comment(&self, id: Uuid) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| comment_from_row(&r)))
    }

    async fn comments_for_answer(&self, answer_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query("SELECT * FROM comments WHERE answer_id = ? ORDER BY created_at ASC")
            .bind(uuid_to_blob(answer_id))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn delete_comment(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_comments_for_answer(&self, answer_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM comments WHERE answer_id = ?")
            .bind(uuid_to_blob(answer_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_community(&self, community: Community) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO communities (id, name, display_name, description, created_by, moderators, member_count, post_count, is_public, rules, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(community.id))
        .bind(community.name)
        .bind(community.display_name)
        .bind(community.description)
        .bind(uuid_to_blob(community.created_by))
        .bind(serde_json::to_string(&community.moderators)?)
        .bind(community.member_count)
        .bind(community.post_count)
        .bind(community.is_public)
        .bind(serde_json::to_string(&community.rules)?)
        .bind(community.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_community_by_name(&self, name: &str) -> anyhow::Result<Option<Community>> {
        let row = sqlx::query("SELECT * FROM communities WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| community_from_row(&r)))
    }

    async fn update_community(&self, community: &Community) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE communities SET display_name = ?, description = ?, moderators = ?, member_count = ?, post_count = ?, is_public = ?, rules = ? WHERE id = ?",
        )
        .bind(&community.display_name)
        .bind(&community.description)
        .bind(serde_json::to_string(&community.moderators)?)
        .bind(community.member_count)
        .bind(community.post_count)
        .bind(community.is_public)
        .bind(serde_json::to_string(&community.rules)?)
        .bind(uuid_to_blob(community.id))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_communities(&self, search: Option<&str>, limit: i64, offset: i64) -> anyhow::Result<Vec<Community>> {
        let rows = if let Some(search) = search {
            let pattern = format!("%{search}%");
            sqlx::query(
                "SELECT * FROM communities WHERE is_public = 1 AND (display_name LIKE ? OR description LIKE ?)
                 ORDER BY member_count DESC LIMIT ? OFFSET ?",
            )
            .bind(pattern.clone())
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT * FROM communities WHERE is_public = 1 ORDER BY member_count DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.iter().map(community_from_row).collect())
    }

    async fn count_communities(&self, search: Option<&str>) -> anyhow::Result<i64> {
        let row = if let Some(search) = search {
            let pattern = format!("%{search}%");
            sqlx::query(
                "SELECT COUNT(*) AS n FROM communities WHERE is_public = 1 AND (display_name LIKE ? OR description LIKE ?)",
            )
            .bind(pattern.clone())
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query("SELECT COUNT(*) AS n FROM communities WHERE is_public = 1")
                .fetch_one(&self.pool)
                .await?
        };
        Ok(row.get("n"))
    }

    async fn list_public_communities(&self) -> anyhow::Result<Vec<Community>> {
        let rows = sqlx::query(
            "SELECT * FROM communities WHERE is_public = 1 ORDER BY member_count DESC, post_count DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(community_from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::models::{Vote, VoteValue};
    use df_core::traits::ForumRepo;

    async fn repo() -> SqliteForumRepo {
        SqliteForumRepo::new("sqlite::memory:").await.unwrap()
    }

    fn test_user(username: &str) -> User {
        User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$test".to_string(),
            reputation: 0,
            bio: String::new(),
            avatar: String::new(),
            is_admin: false,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_question_round_trip_with_votes() {
        let repo = repo().await;
        let author = test_user("alice");
        repo.create_user(author.clone()).await.unwrap();

        let mut question = Question::new(
            author.id,
            "title".into(),
            "body".into(),
            vec!["rust".into(), "sqlite".into()],
        );
        question.votes.push(Vote { user_id: Uuid::now_v7(), value: VoteValue::Up });
        repo.create_question(question.clone()).await.unwrap();

        let loaded = repo.get_question(question.id).await.unwrap().unwrap();
        assert_eq!(loaded.tags, question.tags);
        assert_eq!(loaded.votes, question.votes);
        assert_eq!(loaded.author_id, author.id);
    }

    #[tokio::test]
    async fn test_tag_queries_use_json_columns() {
        let repo = repo().await;
        let author = test_user("bob");
        repo.create_user(author.clone()).await.unwrap();

        for tags in [vec!["rust"], vec!["rust", "async"], vec!["python"]] {
            let q = Question::new(
                author.id,
                "t".into(),
                "b".into(),
                tags.into_iter().map(String::from).collect(),
            );
            repo.create_question(q).await.unwrap();
        }

        assert_eq!(repo.count_questions_with_tag("rust").await.unwrap(), 2);
        assert_eq!(repo.count_questions_with_tag("python").await.unwrap(), 1);
        assert_eq!(repo.count_questions_with_tag("go").await.unwrap(), 0);

        let counts = repo.tag_counts(10).await.unwrap();
        assert_eq!(counts[0], ("rust".to_string(), 2));
    }

    #[tokio::test]
    async fn test_unaccept_other_answers_is_exclusive() {
        let repo = repo().await;
        let author = test_user("carol");
        repo.create_user(author.clone()).await.unwrap();

        let question = Question::new(author.id, "t".into(), "b".into(), vec!["rust".into()]);
        repo.create_question(question.clone()).await.unwrap();

        let mut a1 = Answer::new(question.id, author.id, "first".into());
        a1.is_accepted = true;
        let a2 = Answer::new(question.id, author.id, "second".into());
        repo.create_answer(a1.clone()).await.unwrap();
        repo.create_answer(a2.clone()).await.unwrap();

        repo.unaccept_other_answers(question.id, a2.id).await.unwrap();

        assert!(!repo.get_answer(a1.id).await.unwrap().unwrap().is_accepted);
        // The excepted answer is untouched by this call.
        assert!(!repo.get_answer(a2.id).await.unwrap().unwrap().is_accepted);
    }
}
