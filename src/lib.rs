//! DualPilot: 듀얼 패널 파일 관리 엔진과 자연어 배치 명령 파이프라인

pub mod app;
pub mod config;
pub mod core;
pub mod models;
pub mod system;
pub mod utils;
