//! Runs one snapshot: fetch once, then build, render, rasterize, save and
//! deliver per locale.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{error, info, warn};

use super::delivery_service::{self, AuthenticatedSession, ChatTarget};
use super::raster_service::Rasterizer;
use super::render_service::{render_document, CAPTURE_SELECTOR};
use super::report_service::{build_report, display_timezone};
use crate::api::lark::ChatApi;
use crate::api::market::IndexSource;
use crate::config::Config;
use crate::models::{IndexRecord, Locale, Report};
use crate::utils::{PipelineError, Table};

/// A failed step, kept for the run summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: &'static str,
    pub reason: String,
}

impl From<&PipelineError> for StepFailure {
    fn from(err: &PipelineError) -> Self {
        StepFailure {
            step: err.step(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleOutcome {
    pub locale: Locale,
    pub image: Result<PathBuf, StepFailure>,
    pub delivery: Result<(), StepFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every locale was delivered
    Delivered,
    /// Some locales were delivered, others not
    PartialFailure,
    /// No locale was delivered
    Failed,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Delivered => 0,
            RunStatus::PartialFailure | RunStatus::Failed => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<LocaleOutcome>,
}

impl RunSummary {
    pub fn status(&self) -> RunStatus {
        let delivered = self.outcomes.iter().filter(|o| o.delivery.is_ok()).count();
        if delivered == self.outcomes.len() {
            RunStatus::Delivered
        } else if delivered > 0 {
            RunStatus::PartialFailure
        } else {
            RunStatus::Failed
        }
    }

    pub fn render_table(&self) -> String {
        let mut table = Table::new(vec!["Locale", "Image", "Delivery"]);
        for outcome in &self.outcomes {
            let image = match &outcome.image {
                Ok(path) => path.display().to_string(),
                Err(failure) => format!("❌ {}", failure.step),
            };
            let delivery = match &outcome.delivery {
                Ok(()) => "✅ delivered".to_string(),
                Err(failure) => format!("❌ {}", failure.step),
            };
            table.add_row(vec![outcome.locale.tag().to_string(), image, delivery]);
        }
        table.render()
    }
}

/// File name of a locale's artifact, stamped with the display-timezone date
pub fn image_file_name(locale: Locale, generated_at: &DateTime<FixedOffset>) -> String {
    format!("indices_{}_{}.png", locale.file_tag(), generated_at.format("%Y%m%d"))
}

fn message_title(report: &Report) -> String {
    format!("📊 {} - {}", report.title, report.generated_at.format("%d.%m.%Y"))
}

fn write_image(path: &Path, png: &[u8]) -> Result<(), PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    std::fs::write(path, png).map_err(io_err)
}

pub struct Pipeline<'a> {
    config: &'a Config,
    source: &'a dyn IndexSource,
    chat: &'a dyn ChatApi,
    rasterizer: &'a dyn Rasterizer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn IndexSource,
        chat: &'a dyn ChatApi,
        rasterizer: &'a dyn Rasterizer,
    ) -> Self {
        Self {
            config,
            source,
            chat,
            rasterizer,
        }
    }

    /// Execute one run. Only a failed fetch is returned as an error; every
    /// later failure is confined to its locale and reported in the summary.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<RunSummary, PipelineError> {
        info!("🔄 Fetching market data...");
        let records = self.source.fetch_indices().await.map_err(PipelineError::Fetch)?;
        info!("✅ Got {} indices", records.len());

        let instant = self.config.report_timestamp.unwrap_or(now);

        info!("🔐 Getting Lark access token...");
        let delivery = match self.open_delivery().await {
            Ok((session, target)) => {
                info!("✅ Using chat: {}", target.name.as_deref().unwrap_or(&target.chat_id));
                Ok((session, target))
            }
            Err(err) => {
                error!("❌ {} failed, images will be generated but not sent: {}", err.step(), err);
                Err(StepFailure::from(&err))
            }
        };

        if self.config.lark.announce {
            if let Ok((session, target)) = &delivery {
                let date = instant.with_timezone(&display_timezone()).format("%d.%m.%Y");
                if let Err(err) = session.announce(target, &format!("📊 asiabits Indices - {}", date)).await {
                    warn!("⚠️ Heading message not sent: {}", err);
                }
            }
        }

        let mut outcomes = Vec::with_capacity(Locale::ALL.len());
        for locale in Locale::ALL {
            outcomes.push(self.process_locale(locale, &records, instant, delivery.as_ref()).await);
        }

        Ok(RunSummary { outcomes })
    }

    async fn open_delivery(&self) -> Result<(AuthenticatedSession<'a>, ChatTarget), PipelineError> {
        let session = delivery_service::authenticate(self.chat, self.config.lark.credentials.as_ref()).await?;
        info!("✅ Token obtained");
        if self.config.lark.chat_id.is_none() {
            info!("🔍 Finding bot chats...");
        }
        let target = session.resolve_chat(self.config.lark.chat_id.as_deref()).await?;
        Ok((session, target))
    }

    async fn process_locale(
        &self,
        locale: Locale,
        records: &[IndexRecord],
        instant: DateTime<Utc>,
        delivery: Result<&(AuthenticatedSession<'a>, ChatTarget), &StepFailure>,
    ) -> LocaleOutcome {
        let profile = locale.profile();
        info!("{} Generating {} image...", profile.flag, locale.file_tag());

        let report = build_report(records, locale, instant);
        let document = render_document(&report);
        let file_name = image_file_name(locale, &report.generated_at);

        let png = match self
            .rasterizer
            .rasterize(&document, CAPTURE_SELECTOR, self.config.render_scale)
        {
            Ok(png) => png,
            Err(err) => {
                let err = PipelineError::from(err);
                error!("❌ [{}] {} failed: {}", locale, err.step(), err);
                let failure = StepFailure::from(&err);
                return LocaleOutcome {
                    locale,
                    image: Err(failure.clone()),
                    delivery: Err(failure),
                };
            }
        };

        let path = self.config.output_dir.join(&file_name);
        let image = match write_image(&path, &png) {
            Ok(()) => {
                info!("✅ Saved {}", path.display());
                Ok(path)
            }
            Err(err) => {
                error!("❌ [{}] {} failed: {}", locale, err.step(), err);
                Err(StepFailure::from(&err))
            }
        };

        let delivery = match delivery {
            Ok((session, target)) => self.deliver(session, target, &report, png, &file_name).await,
            Err(failure) => Err(failure.clone()),
        };

        LocaleOutcome {
            locale,
            image,
            delivery,
        }
    }

    async fn deliver(
        &self,
        session: &AuthenticatedSession<'a>,
        target: &ChatTarget,
        report: &Report,
        png: Vec<u8>,
        file_name: &str,
    ) -> Result<(), StepFailure> {
        let locale = report.locale;
        info!("📤 Uploading {} image...", locale.file_tag());

        let result = async {
            let asset = session.upload(png, file_name).await?;
            session
                .deliver(target, &asset, self.config.lark.message_style, &message_title(report))
                .await
        }
        .await;

        match result {
            Ok(()) => {
                info!("✅ {} image sent", locale.file_tag());
                Ok(())
            }
            Err(err) => {
                error!("❌ [{}] {} failed: {}", locale, err.step(), err);
                Err(StepFailure::from(&err))
            }
        }
    }
}
