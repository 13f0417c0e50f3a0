mod common;

use std::time::Duration;

use common::{full_editor, workspace, FakeFetcher, FakeLauncher, FakeSurface, EDITOR_URL};
use render_job_submit::error::{AssetError, PayloadError};
use render_job_submit::orchestrator::exit_code;
use render_job_submit::services::report_writer::REPORT_FILE_NAME;
use render_job_submit::{App, AppError, CompletionOutcome, LocatorProfile, Step, StepOutcome};

const ASSET_URL: &str = "http://x/a.mp4";
const RENDER_URL: &str = "http://x/render/out.mp4";

#[tokio::test(start_paused = true)]
async fn test_end_to_end_render() {
    let (_tmp, config) = workspace(
        r#"{"assetUrls":["http://x/a.mp4"],"scriptText":"[{\"text\":\"Hook\"}]","outputName":"out.mp4"}"#,
    );
    let surface = FakeSurface::new();
    let ids = full_editor(&surface, Duration::from_secs(90), RENDER_URL);
    let launcher = FakeLauncher::new(surface.clone());
    let fetcher = FakeFetcher::new()
        .serve(ASSET_URL, b"source clip")
        .serve(RENDER_URL, b"rendered video");

    let app = App::with_parts(config.clone(), LocatorProfile::default(), fetcher.clone());
    let result = app.run(&launcher).await;
    assert_eq!(exit_code(&result), 0);
    let report = tokio_test::assert_ok!(result);

    assert_eq!(launcher.launches(), 1);
    assert_eq!(std::fs::read_dir(config.assets_dir()).unwrap().count(), 1);
    assert_eq!(report.staged_assets.len(), 1);

    let recorded = surface.recorded();
    assert_eq!(recorded.navigations, vec![EDITOR_URL.to_string()]);
    assert_eq!(recorded.attached, vec![report.staged_assets.clone()]);
    assert!(recorded.closed);

    assert_eq!(surface.clicks_on(ids.new_project), 1);
    assert_eq!(surface.typed_into(ids.text_surface), vec!["Hook"]);
    assert_eq!(report.caption_attempts, 1);
    assert_eq!(surface.clicks_on(ids.export), 1);
    assert_eq!(report.thumbnails_selected, ids.thumbnails.len());

    let artifact = config.output_dir().join("out.mp4");
    assert_eq!(report.artifact(), Some(artifact.as_path()));
    assert_eq!(std::fs::read(&artifact).unwrap(), b"rendered video");
    assert_eq!(report.outcome_of(Step::AwaitCompletion), Some(&StepOutcome::Succeeded));
    assert!(config.report_dir().join(REPORT_FILE_NAME).exists());
}

#[tokio::test(start_paused = true)]
async fn test_missing_assets_never_launch_browser() {
    for payload in [r#"{"projectName":"Demo"}"#, r#"{"assetUrls":[]}"#] {
        let (_tmp, config) = workspace(payload);
        let launcher = FakeLauncher::new(FakeSurface::new());
        let app = App::with_parts(config, LocatorProfile::default(), FakeFetcher::new());

        let result = app.run(&launcher).await;

        assert_eq!(exit_code(&result), 1);
        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, AppError::Payload(PayloadError::MissingAssets)));
        assert_eq!(launcher.launches(), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_payload_is_fatal() {
    let (tmp, mut config) = workspace("{}");
    config.payload_path = tmp.path().join("missing.json");
    let launcher = FakeLauncher::new(FakeSurface::new());
    let app = App::with_parts(config, LocatorProfile::default(), FakeFetcher::new());

    let result = app.run(&launcher).await;

    assert_eq!(exit_code(&result), 1);
    assert!(matches!(
        result,
        Err(AppError::Payload(PayloadError::Unreadable { .. }))
    ));
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_asset_download_failure_aborts_before_launch() {
    let (_tmp, config) = workspace(r#"{"assetUrls":["http://x/a.mp4","http://x/b.mp4"]}"#);
    let launcher = FakeLauncher::new(FakeSurface::new());
    let fetcher = FakeFetcher::new()
        .serve("http://x/a.mp4", b"a")
        .fail("http://x/b.mp4", 404);
    let app = App::with_parts(config, LocatorProfile::default(), fetcher);

    let result = app.run(&launcher).await;

    assert_eq!(exit_code(&result), 1);
    match result {
        Err(AppError::Asset(AssetError::DownloadFailed { index, url, .. })) => {
            assert_eq!(index, 2);
            assert_eq!(url, "http://x/b.mp4");
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.steps)),
    }
    assert_eq!(launcher.launches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_assets_staged_in_order() {
    let (_tmp, config) = workspace(
        r#"{"assetUrls":["http://x/one.mp4","http://x/two.png?sig=1","http://x/three"]}"#,
    );
    let surface = FakeSurface::new();
    full_editor(&surface, Duration::ZERO, RENDER_URL);
    let launcher = FakeLauncher::new(surface.clone());
    let fetcher = FakeFetcher::new()
        .serve("http://x/one.mp4", b"1")
        .serve("http://x/two.png?sig=1", b"2")
        .serve("http://x/three", b"3")
        .serve(RENDER_URL, b"out");
    let app = App::with_parts(config, LocatorProfile::default(), fetcher.clone());

    let report = tokio_test::assert_ok!(app.run(&launcher).await);

    assert_eq!(report.staged_assets.len(), 3);
    let contents: Vec<_> = report
        .staged_assets
        .iter()
        .map(|p| std::fs::read(p).unwrap())
        .collect();
    assert_eq!(contents, vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]);
    assert_eq!(surface.recorded().attached, vec![report.staged_assets.clone()]);

    let requested: Vec<_> = fetcher.requests().into_iter().map(|(url, _)| url).collect();
    assert_eq!(
        &requested[..3],
        &["http://x/one.mp4", "http://x/two.png?sig=1", "http://x/three"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_missing_upload_control_aborts_run() {
    let (_tmp, config) = workspace(r#"{"assetUrls":["http://x/a.mp4"],"scriptText":"Hello"}"#);
    let surface = FakeSurface::new();
    let clickable = LocatorProfile::default().new_project.0[0].scope().to_string();
    let export = surface.node(&clickable).text("Export").add();
    let launcher = FakeLauncher::new(surface.clone());
    let fetcher = FakeFetcher::new().serve(ASSET_URL, b"a");
    let app = App::with_parts(config.clone(), LocatorProfile::default(), fetcher);

    let result = app.run(&launcher).await;

    assert_eq!(exit_code(&result), 1);
    let report = tokio_test::assert_ok!(result);
    assert_eq!(report.steps.last().map(|r| r.step), Some(Step::UploadAssets));
    assert!(report.outcome_of(Step::UploadAssets).is_some_and(StepOutcome::is_fatal));
    assert_eq!(report.outcome_of(Step::PopulateTimeline), None);
    assert_eq!(report.completion, CompletionOutcome::NotReached);
    assert_eq!(surface.clicks_on(export), 0);
    assert!(surface.recorded().closed);
    assert!(config.report_dir().join(REPORT_FILE_NAME).exists());
}

#[tokio::test(start_paused = true)]
async fn test_completion_never_appears_still_exits_zero() {
    let (_tmp, config) = workspace(r#"{"assetUrls":["http://x/a.mp4"],"outputName":"late.mp4"}"#);
    let surface = FakeSurface::new();
    full_editor(&surface, Duration::from_secs(3600), RENDER_URL);
    let launcher = FakeLauncher::new(surface.clone());
    let fetcher = FakeFetcher::new().serve(ASSET_URL, b"a");
    let app = App::with_parts(config.clone(), LocatorProfile::default(), fetcher);

    let result = app.run(&launcher).await;

    assert_eq!(exit_code(&result), 0);
    let report = tokio_test::assert_ok!(result);
    assert_eq!(report.completion, CompletionOutcome::TimedOut);
    assert_eq!(report.artifact(), None);
    assert!(!config.output_dir().join("late.mp4").exists());
    assert!(surface.recorded().closed);
}

#[tokio::test(start_paused = true)]
async fn test_soft_steps_skip_and_continue() {
    let (_tmp, config) = workspace(r#"{"assetUrls":["http://x/a.mp4"]}"#);
    let profile = LocatorProfile::default();
    let surface = FakeSurface::new();
    // 只有上传控件：登录、建项目、时间线、字幕、导出全部找不到
    surface.node(profile.file_input.0[0].scope()).add();
    let launcher = FakeLauncher::new(surface.clone());
    let fetcher = FakeFetcher::new().serve(ASSET_URL, b"a");
    let app = App::with_parts(config, profile, fetcher);

    let report = tokio_test::assert_ok!(app.run(&launcher).await);

    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.steps.len(), Step::ALL.len());
    assert_eq!(report.outcome_of(Step::UploadAssets), Some(&StepOutcome::Succeeded));
    for step in [
        Step::Authenticate,
        Step::CreateProject,
        Step::PopulateTimeline,
        Step::InsertCaptions,
        Step::ApplyEffects,
        Step::TriggerExport,
        Step::AwaitCompletion,
    ] {
        assert!(
            matches!(report.outcome_of(step), Some(StepOutcome::Skipped { .. })),
            "{} should be skipped",
            step
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_envelope_payload_is_unwrapped() {
    let (_tmp, config) = workspace(
        r#"{"action":"render","client_payload":{"projectName":"Launch","assetUrls":["http://x/a.mp4"],"outputName":"launch.mp4"}}"#,
    );
    let surface = FakeSurface::new();
    full_editor(&surface, Duration::ZERO, RENDER_URL);
    let launcher = FakeLauncher::new(surface);
    let fetcher = FakeFetcher::new()
        .serve(ASSET_URL, b"a")
        .serve(RENDER_URL, b"video");
    let app = App::with_parts(config.clone(), LocatorProfile::default(), fetcher);

    let report = tokio_test::assert_ok!(app.run(&launcher).await);

    assert_eq!(report.project, "Launch");
    assert_eq!(report.output_name, "launch.mp4");
    assert_eq!(
        report.artifact(),
        Some(config.output_dir().join("launch.mp4").as_path())
    );
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_is_fatal() {
    let (_tmp, config) = workspace(r#"{"assetUrls":["http://x/a.mp4"]}"#);
    let surface = FakeSurface::new();
    surface.fail_navigation();
    let launcher = FakeLauncher::new(surface.clone());
    let fetcher = FakeFetcher::new().serve(ASSET_URL, b"a");
    let app = App::with_parts(config, LocatorProfile::default(), fetcher);

    let result = app.run(&launcher).await;

    assert_eq!(exit_code(&result), 1);
    let report = tokio_test::assert_ok!(result);
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.aborted_step().map(|r| r.step), Some(Step::Bootstrap));
    assert!(surface.recorded().closed);
}

#[tokio::test(start_paused = true)]
async fn test_launch_failure_is_fatal() {
    let (_tmp, config) = workspace(r#"{"assetUrls":["http://x/a.mp4"]}"#);
    let launcher = FakeLauncher::failing();
    let fetcher = FakeFetcher::new().serve(ASSET_URL, b"a");
    let app = App::with_parts(config, LocatorProfile::default(), fetcher);

    let result = app.run(&launcher).await;

    assert_eq!(exit_code(&result), 1);
    assert!(matches!(result, Err(AppError::Browser(_))));
    assert_eq!(launcher.launches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_string_list_script_is_captioned() {
    let (_tmp, config) = workspace(r#"{"assetUrls":["http://x/a.mp4"],"scriptText":["Hook"]}"#);
    let surface = FakeSurface::new();
    let ids = full_editor(&surface, Duration::ZERO, RENDER_URL);
    let launcher = FakeLauncher::new(surface.clone());
    let fetcher = FakeFetcher::new()
        .serve(ASSET_URL, b"a")
        .serve(RENDER_URL, b"video");
    let app = App::with_parts(config, LocatorProfile::default(), fetcher);

    let result = app.run(&launcher).await;

    assert_eq!(exit_code(&result), 0);
    let report = tokio_test::assert_ok!(result);
    assert_eq!(launcher.launches(), 1);
    assert_eq!(report.caption_attempts, 1);
    assert_eq!(surface.typed_into(ids.text_surface), vec!["Hook"]);
}

#[tokio::test(start_paused = true)]
async fn test_report_never_overwrites_artifact() {
    let (_tmp, config) = workspace(r#"{"assetUrls":["http://x/a.mp4"],"outputName":"run_report.json"}"#);
    let surface = FakeSurface::new();
    full_editor(&surface, Duration::ZERO, RENDER_URL);
    let launcher = FakeLauncher::new(surface);
    let fetcher = FakeFetcher::new()
        .serve(ASSET_URL, b"a")
        .serve(RENDER_URL, b"rendered video");
    let app = App::with_parts(config.clone(), LocatorProfile::default(), fetcher);

    let report = tokio_test::assert_ok!(app.run(&launcher).await);

    let artifact = config.output_dir().join(REPORT_FILE_NAME);
    assert_eq!(report.artifact(), Some(artifact.as_path()));
    assert_eq!(std::fs::read(&artifact).unwrap(), b"rendered video");

    let written = std::fs::read_to_string(config.report_dir().join(REPORT_FILE_NAME)).unwrap();
    assert!(written.contains("\"project\""));
}
