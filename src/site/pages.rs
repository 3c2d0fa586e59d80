//! Public page handlers
//!
//! Read failures are logged and the page renders with empty sections.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Form, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tera::Context as TeraContext;

use crate::api::middleware::AppState;
use crate::models::{CreateContactInput, Event, EventFilter, ListParams, NewsItem, TeamFilter};
use crate::services::{federation_info, ServiceError};
use crate::views::{
    excerpt, format_date, group_members, org_chart, render_rows, CalendarState, DisciplineIcon,
    ExpandState, NewsPage,
};

const HOME_EVENTS: i64 = 3;
const HOME_NEWS: i64 = 4;
const NEWS_PAGE_SIZE: i64 = 12;
const WEEKDAYS: [&str; 7] = ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/news", get(news_list))
        .route("/news/{id}", get(news_detail))
        .route("/events", get(events))
        .route("/team", get(team))
        .route("/leadership", get(leadership))
        .route("/documents", get(documents))
        .route("/contacts", get(contacts).post(submit_contact))
}

#[derive(Debug, Serialize)]
struct NewsCard {
    id: i64,
    title: String,
    date: String,
    image_url: Option<String>,
    excerpt: String,
}

impl From<&NewsItem> for NewsCard {
    fn from(item: &NewsItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            date: format_date(item.published_at.with_timezone(&Local).date_naive()),
            image_url: item.image_url.clone(),
            excerpt: excerpt(&item.content),
        }
    }
}

#[derive(Debug, Serialize)]
struct EventCard {
    id: i64,
    title: String,
    date: String,
    time: Option<String>,
    location: Option<String>,
    event_type: Option<String>,
    description: Option<String>,
}

impl From<&Event> for EventCard {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            date: format_date(event.event_date),
            time: event.event_time.clone(),
            location: event.location.clone(),
            event_type: event.event_type.clone(),
            description: event.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DisciplineCard<'a> {
    name: &'a str,
    description: &'a str,
    glyph: &'static str,
}

fn read_or_empty<T: Default>(what: &str, result: Result<T, ServiceError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::error!("Failed to load {}: {}", what, e);
        T::default()
    })
}

async fn home(State(state): State<AppState>) -> Response {
    let today = Local::now().date_naive();
    let info = federation_info();

    // One failure empties both sections
    let loaded = futures::try_join!(
        state.event_service.upcoming(today, HOME_EVENTS),
        state.news_service.list(ListParams::new(0, HOME_NEWS), false),
    );
    let (upcoming, news) = read_or_empty("home page data", loaded);

    let disciplines: Vec<DisciplineCard> = info
        .disciplines
        .iter()
        .map(|d| DisciplineCard {
            name: &d.name,
            description: &d.description,
            glyph: DisciplineIcon::from_key(&d.icon).glyph(),
        })
        .collect();

    let mut context = TeraContext::new();
    context.insert("info", info);
    context.insert("disciplines", &disciplines);
    context.insert(
        "events",
        &upcoming.iter().map(EventCard::from).collect::<Vec<_>>(),
    );
    context.insert("news", &news.iter().map(NewsCard::from).collect::<Vec<_>>());
    state.site.page("home.html", "/", context)
}

#[derive(Debug, Deserialize)]
struct NewsListQuery {
    #[serde(default)]
    skip: i64,
}

async fn news_list(State(state): State<AppState>, Query(query): Query<NewsListQuery>) -> Response {
    let skip = query.skip.max(0);
    // One extra row tells whether another page exists
    let fetched = read_or_empty(
        "news",
        state
            .news_service
            .list(ListParams::new(skip, NEWS_PAGE_SIZE + 1), false)
            .await,
    );
    let page = NewsPage::from_probe(fetched, skip, NEWS_PAGE_SIZE);

    let mut context = TeraContext::new();
    context.insert(
        "news",
        &page.items.iter().map(NewsCard::from).collect::<Vec<_>>(),
    );
    context.insert("has_more", &page.has_more);
    context.insert("next_skip", &page.next_skip());
    state.site.page("news_list.html", "/news", context)
}

async fn news_detail(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let item = match state.news_service.get(id).await {
        Ok(item) if item.is_visible => item,
        Ok(_) | Err(ServiceError::NotFound(_)) => {
            return state
                .site
                .error_page(StatusCode::NOT_FOUND, "Новость не найдена")
        }
        Err(e) => {
            tracing::error!("Failed to load news {}: {}", id, e);
            return state
                .site
                .error_page(StatusCode::INTERNAL_SERVER_ERROR, "Не удалось загрузить новость");
        }
    };

    let mut context = TeraContext::new();
    context.insert("card", &NewsCard::from(&item));
    context.insert("paragraphs", &item.paragraphs());
    context.insert("images", &item.images);
    state
        .site
        .page("news_detail.html", &format!("/news/{}", id), context)
}

#[derive(Debug, Deserialize)]
struct CalendarQuery {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct CalendarCell {
    day: u32,
    dots: usize,
    has_events: bool,
    is_today: bool,
    is_selected: bool,
    href: String,
}

fn month_href(year: i32, month: u32) -> String {
    format!("/events?year={}&month={}", year, month)
}

async fn events(State(state): State<AppState>, Query(query): Query<CalendarQuery>) -> Response {
    let today = Local::now().date_naive();
    let mut calendar = match (query.year, query.month) {
        (Some(year), Some(month)) => {
            CalendarState::at_month(today, year, month).unwrap_or_else(|| CalendarState::new(today))
        }
        _ => CalendarState::new(today),
    };
    if let Some(day) = query.day {
        if !calendar.select(day) {
            tracing::debug!("Ignoring day {} outside {}-{}", day, calendar.year(), calendar.month());
        }
    }

    let filter = EventFilter {
        include_hidden: false,
        month: Some((calendar.year(), calendar.month())),
    };
    let events = read_or_empty(
        "events",
        state
            .event_service
            .list(filter, ListParams::new(0, ListParams::MAX_LIMIT))
            .await,
    );

    let grid = calendar.grid(&events);
    let base = month_href(grid.year, grid.month);
    let cells: Vec<CalendarCell> = grid
        .days
        .iter()
        .map(|cell| CalendarCell {
            day: cell.day,
            dots: cell.dots,
            has_events: cell.has_events,
            is_today: cell.is_today,
            is_selected: cell.is_selected,
            // Selecting the selected day again clears it
            href: if cell.is_selected {
                base.clone()
            } else {
                format!("{}&day={}", base, cell.date)
            },
        })
        .collect();
    let ((prev_year, prev_month), (next_year, next_month)) = calendar.neighbours();

    let mut context = TeraContext::new();
    context.insert("title", &grid.title);
    context.insert("weekdays", &WEEKDAYS);
    context.insert("leading_blanks", &grid.leading_blanks);
    context.insert("cells", &cells);
    context.insert("prev_href", &month_href(prev_year, prev_month));
    context.insert("next_href", &month_href(next_year, next_month));
    context.insert("selected", &calendar.selected().map(format_date));
    context.insert(
        "events",
        &calendar
            .visible_events(&events)
            .into_iter()
            .map(EventCard::from)
            .collect::<Vec<_>>(),
    );
    state.site.page("events.html", "/events", context)
}

#[derive(Debug, Serialize)]
struct RosterSection {
    title: String,
    juniors: bool,
    members: Vec<crate::models::TeamMember>,
}

async fn team(State(state): State<AppState>) -> Response {
    let members = read_or_empty("team", state.team_service.list(&TeamFilter::default()).await);
    let sections: Vec<RosterSection> = group_members(&members)
        .into_iter()
        .map(|group| RosterSection {
            title: group.title(),
            juniors: group.juniors,
            members: group.members,
        })
        .collect();

    let mut context = TeraContext::new();
    context.insert("sections", &sections);
    context.insert("total", &members.len());
    state.site.page("team.html", "/team", context)
}

async fn leadership(State(state): State<AppState>) -> Response {
    let members = read_or_empty("leadership", state.leadership_service.list(false).await);
    let chart = org_chart(&members);

    let mut context = TeraContext::new();
    context.insert("head", &chart.head);
    context.insert("members", &chart.members);
    state.site.page("leadership.html", "/leadership", context)
}

#[derive(Debug, Deserialize)]
struct TreeQuery {
    #[serde(default)]
    collapsed: String,
}

async fn documents(State(state): State<AppState>, Query(query): Query<TreeQuery>) -> Response {
    let roots = read_or_empty("documents", state.document_service.category_tree(false).await);
    let expand = ExpandState::from_query(&query.collapsed);

    let mut context = TeraContext::new();
    context.insert("rows", &render_rows(&roots, &expand));
    state.site.page("documents.html", "/documents", context)
}

fn contacts_page(state: &AppState, form: Option<&ContactForm>, sent: bool, error: Option<&str>) -> Response {
    let mut context = TeraContext::new();
    context.insert("history", &federation_info().history);
    context.insert("sent", &sent);
    context.insert("error", &error);
    if let Some(form) = form {
        context.insert("form", form);
    }
    state.site.page("contacts.html", "/contacts", context)
}

async fn contacts(State(state): State<AppState>) -> Response {
    contacts_page(&state, None, false, None)
}

/// Form fields of the contact page; `subject` is optional
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContactForm {
    name: String,
    email: String,
    #[serde(default)]
    subject: String,
    message: String,
}

/// No-JS fallback of the contact form
async fn submit_contact(State(state): State<AppState>, Form(form): Form<ContactForm>) -> Response {
    let input = CreateContactInput {
        name: form.name.clone(),
        email: form.email.clone(),
        subject: Some(form.subject.clone()),
        message: form.message.clone(),
    };

    match state.contact_service.submit(input).await {
        Ok(_) => contacts_page(&state, None, true, None),
        Err(ServiceError::ValidationError(msg)) => {
            contacts_page(&state, Some(&form), false, Some(&msg))
        }
        Err(e) => {
            tracing::error!("Failed to submit contact form: {}", e);
            contacts_page(
                &state,
                Some(&form),
                false,
                Some("Не удалось отправить сообщение. Попробуйте позже."),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{build_router, AppState};
    use crate::config::Config;
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateEventInput, CreateNewsInput};
    use crate::services::seed_initial_data;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use chrono::{Datelike, Local, NaiveDate};
    use tower::ServiceExt;

    async fn app() -> (Router, AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        seed_initial_data(&pool).await.unwrap();
        let mut config = Config::default();
        config.upload.path = dir.path().to_path_buf();
        let state = AppState::new(pool, &config).unwrap();
        (build_router(state.clone(), "*"), state, dir)
    }

    async fn page(app: &Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_home_shows_info_and_latest_content() {
        let (app, state, _dir) = app().await;
        let mut news = CreateNewsInput::new("Итоги кубка", "Первый абзац\n\nВторой абзац");
        news.image_url = Some("https://example.org/cup.jpg".to_string());
        state.news_service.create(news).await.unwrap();
        let today = Local::now().date_naive();
        state
            .event_service
            .create(CreateEventInput::new("Хакатон", today))
            .await
            .unwrap();

        let (status, html) = page(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Программирование БАС"));
        assert!(html.contains("Итоги кубка"));
        assert!(html.contains("Хакатон"));
        assert!(html.contains("onerror"));
    }

    #[tokio::test]
    async fn test_news_detail_paragraphs_and_hidden() {
        let (app, state, _dir) = app().await;
        let item = state
            .news_service
            .create(CreateNewsInput::new("Новость", "Раз\n\n\nДва"))
            .await
            .unwrap();

        let (status, html) = page(&app, &format!("/news/{}", item.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<p>Раз</p>"));
        assert!(html.contains("<p>Два</p>"));

        let mut hidden = CreateNewsInput::new("Скрытая", "текст");
        hidden.is_visible = false;
        let hidden = state.news_service.create(hidden).await.unwrap();
        let (status, _) = page(&app, &format!("/news/{}", hidden.id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = page(&app, "/news/9999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_team_page_groups_seeded_roster() {
        let (app, _state, _dir) = app().await;
        let (status, html) = page(&app, "/team").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Основной состав · Продуктовое программирование"));
        assert!(html.contains("Юниоры"));
    }

    #[tokio::test]
    async fn test_documents_and_leadership_pages() {
        let (app, _state, _dir) = app().await;
        let (status, html) = page(&app, "/documents").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Учредительные документы"));
        assert!(html.contains("Нормативные документы"));

        let (status, html) = page(&app, "/leadership").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("org-head"));
    }

    #[tokio::test]
    async fn test_events_calendar_selection_link() {
        let (app, state, _dir) = app().await;
        let today = Local::now().date_naive();
        state
            .event_service
            .create(CreateEventInput::new("Олимпиада", today))
            .await
            .unwrap();

        let uri = format!(
            "/events?year={}&month={}&day={}",
            today.year(),
            today.month(),
            today
        );
        let (status, html) = page(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Олимпиада"));
        assert!(html.contains(" selected\""));

        let (status, _) = page(&app, "/events?year=2025&month=13").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_events_day_outside_month_is_ignored() {
        let (app, state, _dir) = app().await;
        state
            .event_service
            .create(CreateEventInput::new(
                "Весенний кубок",
                NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            ))
            .await
            .unwrap();

        let (status, html) = page(&app, "/events?year=2025&month=3&day=2025-04-02").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Весенний кубок"));
        assert!(!html.contains(" selected\""));
    }

    #[tokio::test]
    async fn test_news_list_with_huge_skip() {
        let (app, _state, _dir) = app().await;
        let (status, _) = page(&app, "/news?skip=9223372036854775807").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_contact_form_fallback() {
        let (app, state, _dir) = app().await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/contacts")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "name=%D0%98%D0%B2%D0%B0%D0%BD&email=ivan%40example.org&subject=&message=Hello",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.contact_service.count().await.unwrap(), 1);

        let (status, html) = page(&app, "/contacts").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("/api/contact"));
    }
}
