use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::api::models::{Article, AuthorRef, Course, CourseRef, Pdf};
use crate::utils::ClientResult;

/// 快照缓存的集合种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Courses,
    Articles,
    Pdfs,
}

impl Collection {
    fn key(&self) -> &'static str {
        match self {
            Collection::Courses => "courses",
            Collection::Articles => "articles",
            Collection::Pdfs => "pdfs",
        }
    }
}

/// 每种集合同一时刻只保存一份完整快照，新抓取整体替换旧快照。
/// 每次替换都推进该集合的代数，带着过期代数的替换会被丢弃，
/// 这样晚到的响应不会覆盖更新的数据。
pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    pub async fn new(database_url: &str) -> ClientResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                database_url
                    .parse::<sqlx::sqlite::SqliteConnectOptions>()?
                    .create_if_missing(true),
            )
            .await?;

        info!("快照缓存已连接: {}", database_url);
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> ClientResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                collection TEXT PRIMARY KEY,
                generation INTEGER NOT NULL DEFAULT 0,
                fetched_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS courses (
                position INTEGER NOT NULL,
                id INTEGER NOT NULL,
                title TEXT NOT NULL,
                type TEXT NOT NULL,
                description TEXT,
                created_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                position INTEGER NOT NULL,
                id INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                course TEXT,
                author TEXT,
                created_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pdfs (
                position INTEGER NOT NULL,
                id INTEGER NOT NULL,
                file_name TEXT NOT NULL,
                extracted_text TEXT,
                course TEXT,
                user TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 发起抓取前记下当前代数，替换时凭它判断响应是否过期
    pub async fn begin(&self, collection: Collection) -> ClientResult<u64> {
        let current: Option<i64> =
            sqlx::query_scalar("SELECT generation FROM snapshots WHERE collection = ?")
                .bind(collection.key())
                .fetch_optional(&self.pool)
                .await?;
        Ok(current.unwrap_or(0) as u64)
    }

    /// 整体替换课程快照；代数不匹配时丢弃并返回 false
    pub async fn replace_courses(&self, observed: u64, items: &[Course]) -> ClientResult<bool> {
        let mut tx = self.pool.begin().await?;
        if !advance_generation(&mut tx, Collection::Courses, observed).await? {
            return Ok(false);
        }

        sqlx::query("DELETE FROM courses").execute(&mut *tx).await?;
        for (position, course) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO courses (position, id, title, type, description, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(position as i64)
            .bind(course.id)
            .bind(&course.title)
            .bind(&course.course_type)
            .bind(&course.description)
            .bind(&course.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    pub async fn replace_articles(&self, observed: u64, items: &[Article]) -> ClientResult<bool> {
        let mut tx = self.pool.begin().await?;
        if !advance_generation(&mut tx, Collection::Articles, observed).await? {
            return Ok(false);
        }

        sqlx::query("DELETE FROM articles").execute(&mut *tx).await?;
        for (position, article) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO articles (position, id, title, content, course, author, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(position as i64)
            .bind(article.id)
            .bind(&article.title)
            .bind(&article.content)
            .bind(to_json(&article.course)?)
            .bind(to_json(&article.author)?)
            .bind(&article.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    pub async fn replace_pdfs(&self, observed: u64, items: &[Pdf]) -> ClientResult<bool> {
        let mut tx = self.pool.begin().await?;
        if !advance_generation(&mut tx, Collection::Pdfs, observed).await? {
            return Ok(false);
        }

        sqlx::query("DELETE FROM pdfs").execute(&mut *tx).await?;
        for (position, pdf) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pdfs (position, id, file_name, extracted_text, course, user) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(position as i64)
            .bind(pdf.id)
            .bind(&pdf.file_name)
            .bind(&pdf.extracted_text)
            .bind(to_json(&pdf.course)?)
            .bind(to_json(&pdf.user)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// None 表示从未抓取过，区别于空快照
    pub async fn courses(&self) -> ClientResult<Option<Vec<Course>>> {
        if !self.has_snapshot(Collection::Courses).await? {
            return Ok(None);
        }

        let rows: Vec<CourseRow> = sqlx::query_as(
            "SELECT id, title, type, description, created_at FROM courses ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(rows.into_iter().map(CourseRow::into_course).collect()))
    }

    pub async fn articles(&self) -> ClientResult<Option<Vec<Article>>> {
        if !self.has_snapshot(Collection::Articles).await? {
            return Ok(None);
        }

        let rows: Vec<ArticleRow> = sqlx::query_as(
            "SELECT id, title, content, course, author, created_at FROM articles ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(rows.into_iter().map(ArticleRow::into_article).collect()))
    }

    pub async fn pdfs(&self) -> ClientResult<Option<Vec<Pdf>>> {
        if !self.has_snapshot(Collection::Pdfs).await? {
            return Ok(None);
        }

        let rows: Vec<PdfRow> = sqlx::query_as(
            "SELECT id, file_name, extracted_text, course, user FROM pdfs ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(rows.into_iter().map(PdfRow::into_pdf).collect()))
    }

    async fn has_snapshot(&self, collection: Collection) -> ClientResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM snapshots WHERE collection = ?")
                .bind(collection.key())
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}

async fn advance_generation(
    tx: &mut Transaction<'_, Sqlite>,
    collection: Collection,
    observed: u64,
) -> ClientResult<bool> {
    let current: Option<i64> =
        sqlx::query_scalar("SELECT generation FROM snapshots WHERE collection = ?")
            .bind(collection.key())
            .fetch_optional(&mut **tx)
            .await?;

    if current.unwrap_or(0) as u64 != observed {
        return Ok(false);
    }

    sqlx::query(
        "INSERT INTO snapshots (collection, generation, fetched_at) \
         VALUES (?, ?, CURRENT_TIMESTAMP) \
         ON CONFLICT(collection) DO UPDATE SET \
             generation = excluded.generation, \
             fetched_at = CURRENT_TIMESTAMP",
    )
    .bind(collection.key())
    .bind((observed + 1) as i64)
    .execute(&mut **tx)
    .await?;

    Ok(true)
}

fn to_json<T: serde::Serialize>(value: &Option<T>) -> ClientResult<Option<String>> {
    match value {
        Some(value) => Ok(Some(serde_json::to_string(value)?)),
        None => Ok(None),
    }
}

fn from_json<T: serde::de::DeserializeOwned>(raw: Option<String>) -> Option<T> {
    raw.and_then(|raw| serde_json::from_str(&raw).ok())
}

#[derive(FromRow)]
struct CourseRow {
    id: i64,
    title: String,
    #[sqlx(rename = "type")]
    course_type: String,
    description: Option<String>,
    created_at: Option<String>,
}

impl CourseRow {
    fn into_course(self) -> Course {
        Course {
            id: self.id,
            title: self.title,
            course_type: self.course_type,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    content: String,
    course: Option<String>,
    author: Option<String>,
    created_at: Option<String>,
}

impl ArticleRow {
    fn into_article(self) -> Article {
        Article {
            id: self.id,
            title: self.title,
            content: self.content,
            course: from_json::<CourseRef>(self.course),
            author: from_json::<AuthorRef>(self.author),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct PdfRow {
    id: i64,
    file_name: String,
    extracted_text: Option<String>,
    course: Option<String>,
    user: Option<String>,
}

impl PdfRow {
    fn into_pdf(self) -> Pdf {
        Pdf {
            id: self.id,
            file_name: self.file_name,
            extracted_text: self.extracted_text,
            course: from_json::<CourseRef>(self.course),
            user: from_json::<AuthorRef>(self.user),
        }
    }
}
