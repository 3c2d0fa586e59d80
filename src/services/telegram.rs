//! Telegram channel import
//!
//! Scrapes the public web preview of a channel (`https://t.me/s/<channel>`)
//! and turns its posts into news items. Posts already imported are matched
//! by their `channel/number` id; the only thing ever updated on them is a
//! missing image.

use crate::config::TelegramConfig;
use crate::db::repositories::NewsRepository;
use crate::models::CreateNewsInput;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;

/// Marker that separates posts in the preview page
const MESSAGE_WRAP: &str = "tgme_widget_message_wrap";
const MESSAGE_TEXT: &str = "tgme_widget_message_text";
const REPLY_MARKER: &str = "js-message_reply_text";

/// Posts with less text than this are skipped
const MIN_TEXT_CHARS: usize = 20;
const MAX_TITLE_CHARS: usize = 200;
const FALLBACK_TITLE: &str = "Новость";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A post parsed from the channel page
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramPost {
    /// `channel/number`
    pub telegram_id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Outcome of one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub images_filled: usize,
}

/// Compiled patterns for the preview page markup
struct PostPatterns {
    text: Regex,
    post_id: Regex,
    date: Regex,
    photo_wrap: Regex,
    background: Regex,
    img_tag: Regex,
    line_break: Regex,
    emoji: Regex,
    tag: Regex,
}

impl PostPatterns {
    fn compile() -> Result<Self> {
        let re = |pattern: &str| {
            Regex::new(pattern).map_err(|e| anyhow!("Invalid pattern {}: {}", pattern, e))
        };
        Ok(Self {
            text: re(r#"(?s)class="tgme_widget_message_text[^"]*"[^>]*>(.*?)</div>"#)?,
            post_id: re(r#"data-post="([^"]+)""#)?,
            date: re(r#"<time[^>]*datetime="([^"]+)"[^>]*>"#)?,
            photo_wrap: re(
                r#"class="tgme_widget_message_photo_wrap[^"]*"[^>]*style="[^"]*background-image:url\(['"]([^'"]+)['"]\)"#,
            )?,
            background: re(r#"background-image:url\(['"]([^'"]+)['"]\)"#)?,
            img_tag: re(r#"<img[^>]*src="([^"]+)"[^>]*class="[^"]*tgme_widget_message_photo[^"]*""#)?,
            line_break: re(r"<br\s*/?>")?,
            emoji: re(r"(?s)<tg-emoji[^>]*>.*?</tg-emoji>")?,
            tag: re(r"<[^>]+>")?,
        })
    }

    fn parse_block(&self, block: &str, index: usize, channel: &str) -> Option<TelegramPost> {
        let raw = self.text.captures(block)?.get(1)?.as_str();

        let before_text = block.split(MESSAGE_TEXT).next().unwrap_or_default();
        if before_text.contains(REPLY_MARKER) {
            return None;
        }

        let content = self.clean_text(raw);
        if content.chars().count() < MIN_TEXT_CHARS {
            return None;
        }

        let title = content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|line| line.chars().take(MAX_TITLE_CHARS).collect())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        let telegram_id = self
            .post_id
            .captures(block)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| format!("{}/{}", channel, index));

        let published_at = self
            .date
            .captures(block)
            .and_then(|c| DateTime::parse_from_rfc3339(&c[1]).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Some(TelegramPost {
            telegram_id,
            title,
            content,
            image_url: self.find_image(block),
            published_at,
        })
    }

    fn clean_text(&self, raw: &str) -> String {
        let text = self.line_break.replace_all(raw, "\n");
        let text = self.emoji.replace_all(&text, "");
        let text = self.tag.replace_all(&text, "");
        text.replace("&nbsp;", " ")
            .replace("&quot;", "\"")
            .replace("&#33;", "!")
            .replace("&amp;", "&")
            .trim()
            .to_string()
    }

    /// Photo wrapper first, then any background image, then an `<img>`,
    /// then any CDN picture
    fn find_image(&self, block: &str) -> Option<String> {
        let first = |re: &Regex| re.captures(block).map(|c| c[1].to_string());

        first(&self.photo_wrap)
            .or_else(|| first(&self.background))
            .or_else(|| first(&self.img_tag))
            .or_else(|| {
                self.background
                    .captures_iter(block)
                    .map(|c| c[1].to_string())
                    .find(|url| {
                        url.contains("cdn")
                            && ["jpg", "jpeg", "png", "webp"]
                                .iter()
                                .any(|ext| url.contains(ext))
                    })
            })
    }
}

/// Imports channel posts as news
pub struct TelegramSync {
    client: reqwest::Client,
    channel: String,
    post_limit: usize,
    patterns: PostPatterns,
    news_repo: Arc<dyn NewsRepository>,
}

impl TelegramSync {
    pub fn new(config: &TelegramConfig, news_repo: Arc<dyn NewsRepository>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fsp-portal/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            channel: config.channel.clone(),
            post_limit: config.post_limit,
            patterns: PostPatterns::compile()?,
            news_repo,
        })
    }

    pub fn channel_url(&self) -> String {
        format!("https://t.me/s/{}", self.channel)
    }

    /// Split a preview page into posts, skipping replies and short posts
    pub fn parse_channel_page(&self, html: &str) -> Vec<TelegramPost> {
        html.split(MESSAGE_WRAP)
            .skip(1)
            .take(self.post_limit)
            .enumerate()
            .filter_map(|(i, block)| self.patterns.parse_block(block, i, &self.channel))
            .collect()
    }

    pub async fn fetch_posts(&self) -> Result<Vec<TelegramPost>> {
        let url = self.channel_url();
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("Telegram returned {} for {}", response.status(), url));
        }

        let html = response.text().await.context("Failed to read channel page")?;
        Ok(self.parse_channel_page(&html))
    }

    /// Fetch the channel and store what is new
    pub async fn sync(&self) -> Result<SyncReport> {
        let posts = self.fetch_posts().await?;
        self.store_posts(posts).await
    }

    /// Create news for unseen posts and fill in images that were missing
    pub async fn store_posts(&self, posts: Vec<TelegramPost>) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for post in posts {
            match self.news_repo.get_by_telegram_id(&post.telegram_id).await? {
                Some(mut existing) => {
                    if existing.image_url.is_none() && post.image_url.is_some() {
                        existing.image_url = post.image_url;
                        self.news_repo
                            .update(&existing)
                            .await
                            .context("Failed to back-fill news image")?;
                        report.images_filled += 1;
                    }
                }
                None => {
                    let input = CreateNewsInput {
                        title: post.title,
                        content: post.content,
                        image_url: post.image_url,
                        published_at: Some(post.published_at),
                        is_visible: true,
                        telegram_id: Some(post.telegram_id),
                    };
                    self.news_repo
                        .create(&input)
                        .await
                        .context("Failed to create news from Telegram post")?;
                    report.created += 1;
                }
            }
        }

        Ok(report)
    }

    /// Sync now, then on every interval tick
    pub async fn run_periodically(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match self.sync().await {
                Ok(report) => tracing::info!(
                    "Telegram sync for {}: {} new, {} images filled",
                    self.channel,
                    report.created,
                    report.images_filled
                ),
                Err(e) => tracing::warn!("Telegram sync failed: {:#}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxNewsRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::models::ListParams;

    const PAGE: &str = r#"
<section>
<div class="tgme_widget_message_wrap js-widget_message_wrap">
  <div class="tgme_widget_message" data-post="fspchuv/101">
    <a class="tgme_widget_message_photo_wrap blured" style="width:800px;background-image:url('https://cdn4.telesco.pe/file/photo101.jpg')"></a>
    <div class="tgme_widget_message_text js-message_text" dir="auto">Итоги регионального этапа<br/>Команда заняла &quot;первое&quot; место&#33; <tg-emoji emoji-id="1"><i class="emoji">🔥</i></tg-emoji>Ура &amp; поздравляем&nbsp;всех</div>
    <time datetime="2026-03-01T12:30:00+00:00" class="time">12:30</time>
  </div>
</div>
<div class="tgme_widget_message_wrap js-widget_message_wrap">
  <div class="tgme_widget_message" data-post="fspchuv/102">
    <div class="tgme_widget_message_reply"><div class="js-message_reply_text">Цитата</div></div>
    <div class="tgme_widget_message_text js-message_text">Это ответ на сообщение, его нужно пропустить целиком</div>
  </div>
</div>
<div class="tgme_widget_message_wrap js-widget_message_wrap">
  <div class="tgme_widget_message" data-post="fspchuv/103">
    <div class="tgme_widget_message_text js-message_text">Коротко</div>
  </div>
</div>
<div class="tgme_widget_message_wrap js-widget_message_wrap">
  <div class="tgme_widget_message" data-post="fspchuv/104">
    <div class="tgme_widget_message_text js-message_text">Открыт набор в юниорскую сборную по программированию</div>
    <time datetime="not a date" class="time"></time>
  </div>
</div>
</section>
"#;

    async fn setup(limit: usize) -> (TelegramSync, Arc<dyn NewsRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        let repo = SqlxNewsRepository::boxed(pool);
        let config = TelegramConfig {
            post_limit: limit,
            ..Default::default()
        };
        (TelegramSync::new(&config, repo.clone()).unwrap(), repo)
    }

    #[tokio::test]
    async fn test_parse_channel_page() {
        let (sync, _) = setup(30).await;
        let posts = sync.parse_channel_page(PAGE);
        assert_eq!(posts.len(), 2);

        let first = &posts[0];
        assert_eq!(first.telegram_id, "fspchuv/101");
        assert_eq!(first.title, "Итоги регионального этапа");
        assert_eq!(
            first.content,
            "Итоги регионального этапа\nКоманда заняла \"первое\" место! Ура & поздравляем всех"
        );
        assert_eq!(
            first.image_url.as_deref(),
            Some("https://cdn4.telesco.pe/file/photo101.jpg")
        );
        assert_eq!(first.published_at.to_rfc3339(), "2026-03-01T12:30:00+00:00");

        let second = &posts[1];
        assert_eq!(second.telegram_id, "fspchuv/104");
        assert_eq!(second.image_url, None);
    }

    #[tokio::test]
    async fn test_limit_applies_to_blocks() {
        let (sync, _) = setup(1).await;
        assert_eq!(sync.parse_channel_page(PAGE).len(), 1);
    }

    #[tokio::test]
    async fn test_long_first_line_is_truncated() {
        let (sync, _) = setup(30).await;
        let long = "я".repeat(250);
        let page = format!(
            r#"<div class="tgme_widget_message_wrap"><div data-post="c/1"><div class="tgme_widget_message_text">{}</div></div></div>"#,
            long
        );
        let posts = sync.parse_channel_page(&page);
        assert_eq!(posts[0].title.chars().count(), 200);
        assert_eq!(posts[0].content.chars().count(), 250);
    }

    #[tokio::test]
    async fn test_store_posts_is_idempotent_and_backfills_images() {
        let (sync, repo) = setup(30).await;
        let mut posts = sync.parse_channel_page(PAGE);
        let image = posts[0].image_url.take();

        let report = sync.store_posts(posts.clone()).await.unwrap();
        assert_eq!(report, SyncReport { created: 2, images_filled: 0 });

        posts[0].image_url = image;
        let report = sync.store_posts(posts).await.unwrap();
        assert_eq!(report, SyncReport { created: 0, images_filled: 1 });

        let stored = repo.get_by_telegram_id("fspchuv/101").await.unwrap().unwrap();
        assert!(stored.image_url.is_some());
        assert_eq!(repo.list(ListParams::new(0, 20), true).await.unwrap().len(), 2);
    }
}
