use async_trait::async_trait;
use rand::Rng;
use tracing::info;

pub const OTP_LEN: usize = 6;

/// Six-digit code drawn uniformly from 100000..=999999.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000u32..=999_999).to_string()
}

/// Delivery channel for verification codes. Delivery never fails.
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    async fn deliver(&self, email: &str, otp: &str);

    /// Send an admin access code requested by `requester` to the admin mailbox.
    async fn deliver_admin_code(&self, recipient: &str, requester: &str, code: &str);
}

/// Mock email sender: writes the code to the log instead of mailing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOtpNotifier;

#[async_trait]
impl OtpNotifier for LogOtpNotifier {
    async fn deliver(&self, email: &str, otp: &str) {
        info!(event = "otp_email", to = %email, code = %otp, "mock email: your 6-digit verification code");
    }

    async fn deliver_admin_code(&self, recipient: &str, requester: &str, code: &str) {
        info!(
            event = "admin_code_email",
            to = %recipient,
            %requester,
            %code,
            "mock email: admin access requested"
        );
    }
}

/// Notifier that remembers every code it was asked to deliver.
pub mod mock {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingOtpNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingOtpNotifier {
        /// Most recent code delivered to `email`.
        pub async fn last_code_for(&self, email: &str) -> Option<String> {
            let sent = self.sent.lock().await;
            sent.iter().rev().find(|(to, _)| to == email).map(|(_, code)| code.clone())
        }

        pub async fn count(&self) -> usize {
            self.sent.lock().await.len()
        }
    }

    #[async_trait]
    impl OtpNotifier for RecordingOtpNotifier {
        async fn deliver(&self, email: &str, otp: &str) {
            self.sent.lock().await.push((email.to_string(), otp.to_string()));
        }

        async fn deliver_admin_code(&self, recipient: &str, _requester: &str, code: &str) {
            self.sent.lock().await.push((recipient.to_string(), code.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits_in_range() {
        for _ in 0..500 {
            let code = generate_otp();
            assert_eq!(code.len(), OTP_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[tokio::test]
    async fn recording_notifier_keeps_latest_code() {
        let n = mock::RecordingOtpNotifier::default();
        n.deliver("a@x.com", "111111").await;
        n.deliver("b@x.com", "222222").await;
        n.deliver("a@x.com", "333333").await;
        assert_eq!(n.last_code_for("a@x.com").await.as_deref(), Some("333333"));
        assert_eq!(n.last_code_for("c@x.com").await, None);
        assert_eq!(n.count().await, 3);
    }
}
