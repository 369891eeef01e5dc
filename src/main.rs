mod api;
mod cache;
mod config;
mod controller;
mod session;
mod utils;
mod views;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use cache::SnapshotStore;
use config::AppConfig;
use controller::AppController;
use session::SessionStore;
use utils::logger;

#[derive(Parser)]
#[command(name = "learnify")]
#[command(about = "Learnify 学习管理系统终端客户端", long_about = None)]
struct Cli {
    /// 跳过删除前的确认提示
    #[arg(long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化配置和本地缓存
    Init,
    /// 登录并保存会话
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// 退出登录（仅清除本地会话，不联系后端）
    Logout,
    /// 注册新用户
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// 查看当前会话
    Status,
    /// 并发拉取全部集合快照
    Refresh,
    /// 仪表盘：统计、欢迎信息、最近课程
    Dashboard,
    /// 课程
    Courses {
        #[command(subcommand)]
        command: CourseCommands,
    },
    /// 文章
    Articles {
        #[command(subcommand)]
        command: ArticleCommands,
    },
    /// PDF 资料
    Pdf {
        #[command(subcommand)]
        command: PdfCommands,
    },
    /// 项目点子
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// 管理员操作
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
enum CourseCommands {
    /// 列出全部课程
    List,
    /// 创建课程
    Add {
        #[arg(long)]
        title: String,
        #[arg(long = "type", default_value = "GENERAL")]
        course_type: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// 查看课程下的文章
    Articles { id: i64 },
    /// 删除课程（管理员）
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ArticleCommands {
    /// 列出文章，可按课程和关键词过滤
    List {
        /// 课程 id 过滤
        #[arg(long)]
        course: Option<i64>,
        /// 标题或正文的子串搜索，大小写不敏感
        #[arg(long)]
        search: Option<String>,
        /// 按课程分组展示
        #[arg(long)]
        grouped: bool,
    },
    /// 发表文章
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        course_id: i64,
    },
    /// 删除文章（管理员）
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum PdfCommands {
    /// 列出 PDF 元数据
    List,
    /// 上传 PDF（multipart）
    Upload {
        file: PathBuf,
        #[arg(long)]
        course_id: Option<i64>,
    },
    /// 下载 PDF 文件
    Fetch {
        id: i64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 删除 PDF（管理员）
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// 按技术栈获取项目建议
    Suggest {
        #[arg(long, value_delimiter = ',')]
        tech: Vec<String>,
    },
    /// 列出全部项目
    List,
    /// 查看项目路线图
    Show { id: i64 },
    /// 新增项目（管理员）
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        summary: String,
        #[arg(long, value_delimiter = ',')]
        tech: Vec<String>,
        /// 路线图步骤，可重复传入
        #[arg(long = "step")]
        roadmap: Vec<String>,
    },
    /// 从 GitHub 仓库导入项目（管理员）
    Import {
        #[arg(long)]
        url: String,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// 用户列表
    Users,
    /// 删除用户
    DeleteUser { id: i64 },
    /// 被举报内容列表
    Reported,
    /// 通过被举报内容
    Approve { id: i64 },
    /// 驳回被举报内容
    Reject { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_logger();

    let cli = Cli::parse();

    if matches!(cli.command, Commands::Init) {
        return init_command().await;
    }

    let config = AppConfig::load()?;
    ensure_dirs(&config)?;

    let session = SessionStore::restore(Path::new(&config.storage.session_dir));
    let cache = SnapshotStore::new(&format!("sqlite:{}", config.storage.cache_path)).await?;
    cache.init_schema().await?;

    let mut app = AppController::new(&config, session, cache, cli.yes);

    match cli.command {
        Commands::Init => {}
        Commands::Login { username, password } => app.login(&username, &password).await?,
        Commands::Logout => app.logout(),
        Commands::Register {
            username,
            password,
            email,
            first_name,
            last_name,
        } => {
            app.register(&username, &password, &email, &first_name, &last_name)
                .await?
        }
        Commands::Status => app.status(),
        Commands::Refresh => app.refresh_all().await?,
        Commands::Dashboard => app.show_dashboard().await?,
        Commands::Courses { command } => match command {
            CourseCommands::List => app.list_courses().await?,
            CourseCommands::Add {
                title,
                course_type,
                description,
            } => app.add_course(&title, &course_type, &description).await?,
            CourseCommands::Articles { id } => app.course_articles(id).await?,
            CourseCommands::Delete { id } => app.delete_course(id).await?,
        },
        Commands::Articles { command } => match command {
            ArticleCommands::List {
                course,
                search,
                grouped,
            } => {
                app.list_articles(course, search.as_deref(), grouped)
                    .await?
            }
            ArticleCommands::Add {
                title,
                content,
                course_id,
            } => app.add_article(&title, &content, course_id).await?,
            ArticleCommands::Delete { id } => app.delete_article(id).await?,
        },
        Commands::Pdf { command } => match command {
            PdfCommands::List => app.list_pdfs().await?,
            PdfCommands::Upload { file, course_id } => app.upload_pdf(&file, course_id).await?,
            PdfCommands::Fetch { id, output } => app.fetch_pdf_file(id, output).await?,
            PdfCommands::Delete { id } => app.delete_pdf(id).await?,
        },
        Commands::Projects { command } => match command {
            ProjectCommands::Suggest { tech } => app.suggest_projects(&tech).await?,
            ProjectCommands::List => app.list_projects().await?,
            ProjectCommands::Show { id } => app.show_project(id).await?,
            ProjectCommands::Add {
                title,
                summary,
                tech,
                roadmap,
            } => app.add_project(&title, &summary, tech, roadmap).await?,
            ProjectCommands::Import { url } => app.import_project(&url).await?,
        },
        Commands::Admin { command } => match command {
            AdminCommands::Users => app.admin_users().await?,
            AdminCommands::DeleteUser { id } => app.admin_delete_user(id).await?,
            AdminCommands::Reported => app.admin_reported().await?,
            AdminCommands::Approve { id } => app.admin_approve(id).await?,
            AdminCommands::Reject { id } => app.admin_reject(id).await?,
        },
    }

    Ok(())
}

async fn init_command() -> Result<()> {
    info!("初始化客户端...");

    tokio::fs::create_dir_all("config").await?;
    tokio::fs::create_dir_all("data/session").await?;
    tokio::fs::create_dir_all("data/downloads").await?;

    let config = AppConfig::default();
    config.save("config/settings.toml")?;
    info!("已生成配置文件: config/settings.toml");

    let cache = SnapshotStore::new(&format!("sqlite:{}", config.storage.cache_path)).await?;
    cache.init_schema().await?;
    info!("本地快照缓存初始化完成");

    info!("✅ 初始化完成！");
    info!("下一步:");
    info!("  1. 编辑 config/settings.toml 配置后端地址");
    info!("  2. 运行 'learnify login -u <用户名> -p <密码>' 登录");
    info!("  3. 运行 'learnify refresh' 拉取数据");
    Ok(())
}

fn ensure_dirs(config: &AppConfig) -> Result<()> {
    if let Some(parent) = Path::new(&config.storage.cache_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.storage.session_dir)?;
    Ok(())
}
