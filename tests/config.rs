mod helpers;

use helpers::config_file;
use notify_hub::cli::Cli;
use notify_hub::config::{Config, PlatformConfig};
use notify_hub::core::{ChannelType, Platform};
use serial_test::serial;

/// Sets `NOTIFY_` variables for one test and removes them on drop.
struct EnvVars(Vec<&'static str>);

impl EnvVars {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        Self(vars.iter().map(|(key, _)| *key).collect())
    }
}

impl Drop for EnvVars {
    fn drop(&mut self) {
        for key in &self.0 {
            std::env::remove_var(key);
        }
    }
}

fn load(content: &str) -> anyhow::Result<Config> {
    let file = config_file(content);
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    Config::load(&cli)
}

#[test]
#[serial]
fn test_load_telegram_bot_config() {
    let config = load(
        r#"
        log_level = "debug"
        request_timeout_seconds = 3
        [platform]
        kind = "Telegram"
        token = "123:abc"
        channel_type = "Bot"
        chat_ids = [1, 2, 3]
        menu_bot = "my_swapbot"
    "#,
    )
    .unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.request_timeout_seconds, 3);
    let Some(PlatformConfig::Telegram(telegram)) = config.platform else {
        panic!("expected a Telegram platform");
    };
    assert_eq!(telegram.token, "123:abc");
    assert_eq!(telegram.channel_type, ChannelType::Bot);
    assert_eq!(telegram.chat_ids, vec![1, 2, 3]);
    assert_eq!(telegram.menu_bot, "my_swapbot");
}

#[test]
#[serial]
fn test_defaults_apply_for_missing_keys() {
    let config = load(
        r#"
        [platform]
        kind = "Telegram"
        token = "123:abc"
        channel = "@mychannel"
        topic_id = 7
    "#,
    )
    .unwrap();

    assert_eq!(config.log_level, "info");
    assert_eq!(config.request_timeout_seconds, 10);
    let Some(PlatformConfig::Telegram(telegram)) = config.platform else {
        panic!("expected a Telegram platform");
    };
    assert_eq!(telegram.channel_type, ChannelType::Group);
    assert_eq!(telegram.topic_id.as_deref(), Some("7"));
    assert_eq!(telegram.menu_bot, "official_swapbot");
}

#[test]
#[serial]
fn test_aws_email_tag_selects_ses() {
    let config = load(
        r#"
        [platform]
        kind = "AwsEmail"
        to_email = "ops@example.com"
        key = "AKIDEXAMPLE"
        secret = "secret"
        area = "eu-west-1"
        sender = "alerts@example.com"
    "#,
    )
    .unwrap();

    let platform = config.platform.unwrap();
    assert_eq!(platform.platform(), Platform::Ses);
    let PlatformConfig::Ses(ses) = platform else {
        panic!("expected an SES platform");
    };
    assert_eq!(ses.to, "ops@example.com");
    assert_eq!(ses.region, "eu-west-1");
}

#[test]
#[serial]
fn test_argus_and_absent_platform_load() {
    let config = load("[platform]\nkind = \"Argus\"\n").unwrap();
    assert_eq!(config.platform, Some(PlatformConfig::Argus));

    let config = load("log_level = \"warn\"\n").unwrap();
    assert_eq!(config.platform, None);
}

#[test]
#[serial]
fn test_unknown_platform_kind_is_an_error() {
    let err = load("[platform]\nkind = \"Carrier Pigeon\"\ntoken = \"x\"\n").unwrap_err();
    assert!(err.to_string().contains("Carrier Pigeon"), "{err}");
}

#[test]
#[serial]
fn test_cli_overrides_file() {
    let file = config_file(
        r#"
        log_level = "debug"
        [platform]
        kind = "Slack"
        token = "from-file"
        channel = "C0123"
    "#,
    );
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        log_level: Some("trace".to_string()),
        timeout: Some(2),
        token: Some("from-cli".to_string()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "trace");
    assert_eq!(config.request_timeout_seconds, 2);
    let Some(PlatformConfig::Slack(slack)) = config.platform else {
        panic!("expected a Slack platform");
    };
    assert_eq!(slack.token, "from-cli");
    assert_eq!(slack.channel, "C0123");
}

#[test]
#[serial]
fn test_cli_token_does_not_clash_with_dingtalk_secret() {
    let file = config_file(
        r#"
        [platform]
        kind = "DingTalk"
        channel = "https://oapi.dingtalk.com/robot/send?access_token=abc"
        secret = "SEC123"
    "#,
    );
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        token: Some("from-cli".to_string()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    let Some(PlatformConfig::DingTalk(dingtalk)) = config.platform else {
        panic!("expected a DingTalk platform");
    };
    assert_eq!(dingtalk.secret, "SEC123");
    assert!(dingtalk.webhook_url.ends_with("access_token=abc"));
}

#[test]
#[serial]
fn test_cli_token_without_platform_is_a_clear_error() {
    let file = config_file("log_level = \"warn\"\n");
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        token: Some("from-cli".to_string()),
        ..Default::default()
    };

    let err = Config::load(&cli).unwrap_err();

    assert!(err.to_string().contains("no platform is configured"), "{err}");
}

#[test]
#[serial]
fn test_env_token_overrides_file() {
    let _env = EnvVars::set(&[("NOTIFY_PLATFORM__TOKEN", "xoxb-from-env")]);

    let config = load(
        r#"
        [platform]
        kind = "Slack"
        token = "from-file"
        channel = "C0123"
    "#,
    )
    .unwrap();

    let Some(PlatformConfig::Slack(slack)) = config.platform else {
        panic!("expected a Slack platform");
    };
    assert_eq!(slack.token, "xoxb-from-env");
    assert_eq!(slack.channel, "C0123");
}

#[test]
#[serial]
fn test_numeric_channels_load_from_file_and_env() {
    let config = load(
        r#"
        [platform]
        kind = "Telegram"
        token = "123:abc"
        channel = -1001234567890
    "#,
    )
    .unwrap();
    let Some(PlatformConfig::Telegram(telegram)) = config.platform else {
        panic!("expected a Telegram platform");
    };
    assert_eq!(telegram.channel, "-1001234567890");

    let _env = EnvVars::set(&[
        ("NOTIFY_PLATFORM__KIND", "Discord"),
        ("NOTIFY_PLATFORM__TOKEN", "bot-token"),
        ("NOTIFY_PLATFORM__CHANNEL", "998877"),
    ]);
    let config = load("log_level = \"warn\"\n").unwrap();
    let Some(PlatformConfig::Discord(discord)) = config.platform else {
        panic!("expected a Discord platform");
    };
    assert_eq!(discord.token, "bot-token");
    assert_eq!(discord.channel, "998877");
}

#[test]
#[serial]
fn test_env_numeric_channel_for_telegram() {
    let _env = EnvVars::set(&[("NOTIFY_PLATFORM__CHANNEL", "-1001234567890")]);

    let config = load(
        r#"
        [platform]
        kind = "Telegram"
        token = "123:abc"
        channel = "@mychannel"
    "#,
    )
    .unwrap();

    let Some(PlatformConfig::Telegram(telegram)) = config.platform else {
        panic!("expected a Telegram platform");
    };
    assert_eq!(telegram.channel, "-1001234567890");
}

#[test]
#[serial]
fn test_env_retry_interval_uses_snake_case() {
    let _env = EnvVars::set(&[("NOTIFY_PLATFORM__RETRY_INTERVAL", "60")]);

    let config = load(
        r#"
        [platform]
        kind = "Pushover"
        token = "app"
        user = "user-key"
        priority = 2
        retryExpire = 3600
    "#,
    )
    .unwrap();

    let Some(PlatformConfig::Pushover(pushover)) = config.platform else {
        panic!("expected a Pushover platform");
    };
    assert_eq!(pushover.retry_interval, Some(60));
    assert_eq!(pushover.retry_expire, Some(3600));
}
