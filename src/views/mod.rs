//! 终端文本渲染。只做数据到字符串的拼装，由控制器负责打印，
//! 过滤/分组等数据变换在 cache::views 里完成。

use crate::api::models::{
    Article, Course, Pdf, Project, ReportedContent, UserAccount,
};
use crate::session::SessionUser;

pub struct DashboardStats {
    pub courses: usize,
    pub articles: usize,
    pub pdfs: usize,
}

pub fn course_card(course: &Course) -> String {
    let mut card = String::new();
    card.push_str(&format!(
        "[{}] {} ({})\n",
        course.id, course.title, course.course_type
    ));
    card.push_str(&format!(
        "    {}\n",
        course
            .description
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or("No description available")
    ));
    let created = fmt_date(course.created_at.as_deref());
    if !created.is_empty() {
        card.push_str(&format!("    Created: {}\n", created));
    }
    card
}

pub fn course_list(courses: &[Course]) -> String {
    if courses.is_empty() {
        return "No courses found.".to_string();
    }
    let mut out = String::new();
    for course in courses {
        out.push_str(&course_card(course));
    }
    out
}

pub fn article_card(article: &Article) -> String {
    format!(
        "[{}] {}\n    {}\n    Course: {} | By: {}\n",
        article.id,
        article.title,
        preview(&article.content, 120),
        article
            .course
            .as_ref()
            .and_then(|course| course.title.as_deref())
            .unwrap_or("Unassigned"),
        article
            .author
            .as_ref()
            .and_then(|author| author.username.as_deref())
            .unwrap_or("N/A"),
    )
}

pub fn article_count(count: usize) -> String {
    if count == 1 {
        "1 article".to_string()
    } else {
        format!("{} articles", count)
    }
}

pub fn article_list(articles: &[&Article]) -> String {
    if articles.is_empty() {
        return "No articles found.".to_string();
    }
    let mut out = String::new();
    for article in articles {
        out.push_str(&article_card(article));
    }
    out
}

/// 分组视图：每个课程一个小节，标题从课程快照里找；
/// 找不到对应课程（或文章未关联课程）归入 Unassigned 小节
pub fn grouped_articles(
    groups: &[(Option<i64>, Vec<&Article>)],
    courses: &[Course],
) -> String {
    if groups.is_empty() {
        return "No articles found.".to_string();
    }

    let mut out = String::new();
    for (key, bucket) in groups {
        let heading = key
            .and_then(|id| courses.iter().find(|course| course.id == id))
            .map(|course| format!("{} ({})", course.title, course.course_type))
            .unwrap_or_else(|| "Unassigned / No Course".to_string());

        out.push_str(&format!("== {} ==\n", heading));
        for article in bucket {
            out.push_str(&article_card(article));
        }
    }
    out
}

pub fn pdf_card(pdf: &Pdf) -> String {
    let course_label = match &pdf.course {
        Some(course) => match &course.title {
            Some(title) => format!("{} ({})", title, course.id),
            None => format!("ID: {}", course.id),
        },
        None => "N/A".to_string(),
    };
    let by_label = pdf
        .user
        .as_ref()
        .and_then(|user| user.username.as_deref())
        .unwrap_or("N/A");

    let mut card = format!("[{}] {}\n", pdf.id, pdf.file_name);
    if let Some(text) = pdf
        .extracted_text
        .as_deref()
        .filter(|text| !text.is_empty())
    {
        card.push_str(&format!("    {}\n", preview(text, 100)));
    }
    card.push_str(&format!("    Course: {} | By: {}\n", course_label, by_label));
    card
}

pub fn pdf_list(pdfs: &[Pdf]) -> String {
    if pdfs.is_empty() {
        return "No PDFs found.".to_string();
    }
    let mut out = String::new();
    for pdf in pdfs {
        out.push_str(&pdf_card(pdf));
    }
    out
}

pub fn project_card(project: &Project) -> String {
    let mut card = String::new();
    match project.id {
        Some(id) => card.push_str(&format!("[{}] {}\n", id, project.title)),
        None => card.push_str(&format!("{}\n", project.title)),
    }
    card.push_str(&format!(
        "    {}\n",
        project.summary.as_deref().unwrap_or("No summary")
    ));
    card.push_str(&format!("    Tech: {}\n", project.technologies.join(", ")));
    card
}

pub fn project_list(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects found for your technology stack. Try adding more technologies!"
            .to_string();
    }
    let mut out = String::new();
    for project in projects {
        out.push_str(&project_card(project));
    }
    out
}

/// 单个项目的路线图视图
pub fn project_roadmap(project: &Project) -> String {
    let mut out = project_card(project);

    if project.extra_technologies.is_empty() {
        out.push_str("    You know all required technologies!\n");
    } else {
        out.push_str(&format!(
            "    You need to learn: {}\n",
            project.extra_technologies.join(", ")
        ));
    }

    if !project.roadmap.is_empty() {
        out.push_str("    Roadmap:\n");
        for (index, step) in project.roadmap.iter().enumerate() {
            out.push_str(&format!("      {}. {}\n", index + 1, step));
        }
    }
    out
}

pub fn user_card(user: &UserAccount) -> String {
    let admin_mark = if user.role == "ADMIN" { " (Admin)" } else { "" };
    format!(
        "[{}] {}{}\n    Email: {} | Role: {}\n",
        user.id,
        user.username,
        admin_mark,
        user.email.as_deref().unwrap_or("N/A"),
        user.role,
    )
}

pub fn user_list(users: &[UserAccount]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }
    let mut out = String::new();
    for user in users {
        out.push_str(&user_card(user));
    }
    out
}

pub fn reported_card(content: &ReportedContent) -> String {
    format!(
        "[{}] {}\n    {}\n    Reported: {} | Approved: {}\n",
        content.id,
        content.file_name.as_deref().unwrap_or("Reported Content"),
        content.reason.as_deref().unwrap_or("Reported for review"),
        yes_no(content.reported),
        yes_no(content.approved),
    )
}

pub fn reported_list(contents: &[ReportedContent]) -> String {
    if contents.is_empty() {
        return "No reported content.".to_string();
    }
    let mut out = String::new();
    for content in contents {
        out.push_str(&reported_card(content));
    }
    out
}

pub fn dashboard(
    stats: &DashboardStats,
    user: Option<&SessionUser>,
    recent: &[&Course],
) -> String {
    let mut out = String::new();
    out.push_str("==== Learnify Dashboard ====\n");
    if let Some(user) = user {
        out.push_str(&format!("Welcome back, {}!\n", user.username));
    }
    out.push_str(&format!(
        "Courses: {} | Articles: {} | PDFs: {}\n",
        stats.courses, stats.articles, stats.pdfs
    ));

    out.push_str("\nRecent Courses:\n");
    if recent.is_empty() {
        out.push_str("No courses found.\n");
    } else {
        for course in recent {
            out.push_str(&course_card(course));
        }
    }
    out
}

pub fn session_status(user: Option<&SessionUser>) -> String {
    match user {
        Some(user) => format!(
            "Logged in as {} ({}){}",
            user.username,
            user.role,
            user.email
                .as_deref()
                .map(|email| format!(" <{}>", email))
                .unwrap_or_default(),
        ),
        None => "Not logged in.".to_string(),
    }
}

pub fn fmt_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d").to_string();
    }
    // Spring 的 LocalDateTime 序列化没有时区后缀
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::CourseRef;

    #[test]
    fn article_count_pluralizes() {
        assert_eq!(article_count(0), "0 articles");
        assert_eq!(article_count(1), "1 article");
        assert_eq!(article_count(4), "4 articles");
    }

    #[test]
    fn empty_lists_render_empty_states() {
        assert_eq!(course_list(&[]), "No courses found.");
        assert_eq!(article_list(&[]), "No articles found.");
        assert_eq!(pdf_list(&[]), "No PDFs found.");
        assert!(project_list(&[]).starts_with("No projects found"));
    }

    #[test]
    fn fmt_date_handles_spring_local_date_time() {
        assert_eq!(fmt_date(Some("2024-05-12T10:30:00")), "2024-05-12");
        assert_eq!(fmt_date(Some("2024-05-12T10:30:00.123")), "2024-05-12");
        assert_eq!(fmt_date(Some("2024-05-12T10:30:00+02:00")), "2024-05-12");
        assert_eq!(fmt_date(Some("yesterday")), "yesterday");
        assert_eq!(fmt_date(None), "");
    }

    #[test]
    fn grouped_articles_labels_unknown_courses_as_unassigned() {
        let articles = vec![Article {
            id: 1,
            title: "t".to_string(),
            content: "c".to_string(),
            course: Some(CourseRef { id: 42, title: None }),
            author: None,
            created_at: None,
        }];
        let refs: Vec<&Article> = articles.iter().collect();
        let groups = vec![(Some(42), refs)];

        let out = grouped_articles(&groups, &[]);
        assert!(out.contains("Unassigned / No Course"));
    }

    #[test]
    fn roadmap_lists_missing_technologies() {
        let project = Project {
            id: Some(1),
            title: "Chat App".to_string(),
            summary: None,
            technologies: vec!["Java".to_string(), "WebSocket".to_string()],
            extra_technologies: vec!["WebSocket".to_string()],
            roadmap: vec!["Design schema".to_string(), "Build API".to_string()],
        };

        let out = project_roadmap(&project);
        assert!(out.contains("You need to learn: WebSocket"));
        assert!(out.contains("1. Design schema"));
    }
}
