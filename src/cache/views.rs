//! 快照之上的派生视图。全部是纯函数，不碰存储也不碰渲染，
//! 可以在没有任何环境的情况下单测。

use crate::api::models::{Article, Course};

/// 按课程分组文章，未关联课程的归入 None 桶。
/// 桶的顺序按课程在文章序列里首次出现的顺序，桶内保持原顺序。
pub fn group_by_course(articles: &[Article]) -> Vec<(Option<i64>, Vec<&Article>)> {
    let mut groups: Vec<(Option<i64>, Vec<&Article>)> = Vec::new();
    for article in articles {
        let key = article.course.as_ref().map(|course| course.id);
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, bucket)) => bucket.push(article),
            None => groups.push((key, vec![article])),
        }
    }
    groups
}

/// 课程过滤 + 大小写不敏感的子串搜索（标题或正文命中即可）。
/// 空条件匹配全部，顺序保持不变。
pub fn filter_articles<'a>(
    articles: &'a [Article],
    course_id: Option<i64>,
    search: Option<&str>,
) -> Vec<&'a Article> {
    let term = search
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty());

    articles
        .iter()
        .filter(|article| match course_id {
            Some(id) => article
                .course
                .as_ref()
                .map(|course| course.id == id)
                .unwrap_or(false),
            None => true,
        })
        .filter(|article| match &term {
            Some(term) => {
                article.title.to_lowercase().contains(term.as_str())
                    || article.content.to_lowercase().contains(term.as_str())
            }
            None => true,
        })
        .collect()
}

/// 最近课程 = 快照末尾 3 条倒序。假定后端按创建顺序返回课程。
pub fn recent_courses(courses: &[Course]) -> Vec<&Course> {
    courses.iter().rev().take(3).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::CourseRef;

    fn article(id: i64, title: &str, content: &str, course_id: Option<i64>) -> Article {
        Article {
            id,
            title: title.to_string(),
            content: content.to_string(),
            course: course_id.map(|id| CourseRef { id, title: None }),
            author: None,
            created_at: None,
        }
    }

    fn course(id: i64) -> Course {
        Course {
            id,
            title: format!("course {id}"),
            course_type: "TEXT".to_string(),
            description: None,
            created_at: None,
        }
    }

    #[test]
    fn course_filter_returns_exact_subset_in_order() {
        let articles = vec![
            article(1, "a", "x", Some(7)),
            article(2, "b", "y", Some(8)),
            article(3, "c", "z", Some(7)),
            article(4, "d", "w", None),
        ];

        let filtered = filter_articles(&articles, Some(7), None);
        let ids: Vec<i64> = filtered.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn unassigned_articles_never_match_a_course_filter() {
        let articles = vec![article(1, "a", "x", None)];
        assert!(filter_articles(&articles, Some(7), None).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_title_or_content() {
        let articles = vec![
            article(1, "Ownership in Rust", "moves and borrows", Some(1)),
            article(2, "Lifetimes", "the BORROW checker", Some(1)),
            article(3, "Tokio", "async runtime", Some(1)),
        ];

        let filtered = filter_articles(&articles, None, Some("BoRrOw"));
        let ids: Vec<i64> = filtered.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn empty_search_matches_everything() {
        let articles = vec![article(1, "a", "x", None), article(2, "b", "y", None)];
        assert_eq!(filter_articles(&articles, None, Some("   ")).len(), 2);
        assert_eq!(filter_articles(&articles, None, None).len(), 2);
    }

    #[test]
    fn course_and_search_filters_compose() {
        let articles = vec![
            article(1, "rust intro", "x", Some(7)),
            article(2, "rust intro", "x", Some(8)),
            article(3, "java intro", "x", Some(7)),
        ];

        let filtered = filter_articles(&articles, Some(7), Some("rust"));
        let ids: Vec<i64> = filtered.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn grouping_preserves_first_encounter_order() {
        let articles = vec![
            article(1, "a", "x", Some(8)),
            article(2, "b", "y", None),
            article(3, "c", "z", Some(7)),
            article(4, "d", "w", Some(8)),
        ];

        let groups = group_by_course(&articles);
        let keys: Vec<Option<i64>> = groups.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![Some(8), None, Some(7)]);

        let bucket: Vec<i64> = groups[0].1.iter().map(|a| a.id).collect();
        assert_eq!(bucket, vec![1, 4]);
    }

    #[test]
    fn recent_courses_is_last_three_reversed() {
        let courses: Vec<Course> = (1..=5).map(course).collect();
        let recent = recent_courses(&courses);
        let ids: Vec<i64> = recent.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn recent_courses_handles_short_and_empty_snapshots() {
        assert!(recent_courses(&[]).is_empty());

        let courses = vec![course(1), course(2)];
        let ids: Vec<i64> = recent_courses(&courses).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
