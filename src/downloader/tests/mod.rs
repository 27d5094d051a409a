use super::test_helpers::*;
use super::*;
use crate::error::{Error, ToHttpStatus};
use crate::types::{DownloadResult, TransferId};
use std::time::Duration;
use wiremock::ResponseTemplate;
