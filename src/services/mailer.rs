//! # 메일 전송
//!
//! 피드백 메일을 내보내는 전송 수단들입니다.
//! - `Outbox`: outbox 디렉토리에 메일 한 통당 파일 하나를 기록 (외부 MTA가 가져감)
//! - `Log`: 메일 내용을 로그로만 남김
//! - `Memory`: 보낸 메일을 메모리에 쌓아둠 (테스트용)
//!
//! 전송 실패는 `MailError`로 돌려주지만, 피드백 핸들러는 이를 로그만 남기고 무시합니다.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use thiserror::Error;
use tokio::fs;

use crate::config::{MailSettings, MailTransport};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to write mail to outbox: {0}")]
    Io(#[from] std::io::Error),

    #[error("mail transport is unavailable: {0}")]
    Unavailable(String),
}

/// 보낼 메일 한 통
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        fs::create_dir_all(&self.dir).await?;

        let id = uuid::Uuid::now_v7();
        let path = self.dir.join(format!("{id}.eml"));
        let message = format!(
            "To: {}\r\nSubject: {}\r\nDate: {}\r\nMessage-ID: <{id}@katalog>\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\r\n{}",
            mail.to,
            mail.subject,
            Utc::now().to_rfc2822(),
            mail.body,
        );
        fs::write(&path, message).await?;

        tracing::info!(path = %path.display(), to = %mail.to, "Mail written to outbox");
        Ok(())
    }
}

/// 보낸 메일을 기록만 하는 전송 수단. clone해도 같은 목록을 공유합니다.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
    /// true면 모든 전송이 실패합니다.
    failing: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 항상 전송에 실패하는 메일러
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if self.failing {
            return Err(MailError::Unavailable("memory mailer set to fail".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| MailError::Unavailable("memory mailer lock poisoned".to_string()))?
            .push(mail.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Mailer {
    Outbox(OutboxMailer),
    Log,
    Memory(MemoryMailer),
}

impl Mailer {
    pub fn from_settings(settings: &MailSettings) -> Self {
        match settings.transport {
            MailTransport::Outbox => Mailer::Outbox(OutboxMailer::new(&settings.outbox_path)),
            MailTransport::Log => Mailer::Log,
        }
    }

    /// 메일을 한 번 보냅니다. 재시도하지 않습니다.
    pub async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        match self {
            Mailer::Outbox(outbox) => outbox.send(mail).await,
            Mailer::Log => {
                tracing::info!(to = %mail.to, subject = %mail.subject, body = %mail.body, "Mail");
                Ok(())
            }
            Mailer::Memory(memory) => memory.send(mail),
        }
    }
}
