mod common;

use std::fs;

use serde_json::{Value, json};

use lang_cache::app::App;
use lang_cache::cache::CacheLayout;
use lang_cache::client::LanguageApiClient;
use lang_cache::config::{AppletEntry, ApplicationLanguages, default_applets};
use lang_cache::domain::{GenerateTarget, Language};
use lang_cache::generator::{Generator, Pipeline};
use lang_cache::report::FailureKind;
use lang_cache::writer::FileWriter;

use common::{MockTransport, content_for, happy_api, ok, param, temp_root};

fn applications() -> Vec<ApplicationLanguages> {
    vec![
        ApplicationLanguages {
            id: "portal".parse().unwrap(),
            languages: vec!["en".parse().unwrap(), "hu".parse().unwrap()],
        },
        ApplicationLanguages {
            id: "member".parse().unwrap(),
            languages: vec!["de".parse().unwrap()],
        },
    ]
}

fn app<F>(root: &camino::Utf8Path, respond: F, jobs: usize) -> App<LanguageApiClient<MockTransport<F>>, FileWriter>
where
    F: Fn(&lang_cache::api::ApiRequest) -> Value + Send + Sync,
{
    let pipeline = Pipeline::new(
        LanguageApiClient::new(MockTransport::new(respond)),
        FileWriter::default(),
        CacheLayout::new(root.to_path_buf()),
    )
    .with_jobs(jobs);
    App::new(pipeline, applications(), default_applets())
}

#[test]
fn application_files_match_remote_content() {
    let (_temp, root) = temp_root();
    let app = app(&root, happy_api(&["en"]), 1);

    let report = app.generate(GenerateTarget::Applications);
    assert!(report.is_success());
    assert_eq!(report.succeeded_count(), 3);

    let layout = CacheLayout::new(root.clone());
    for application in applications() {
        for language in &application.languages {
            let path = layout.application_path(&application.id, language);
            let bytes = fs::read(path.as_std_path()).unwrap();
            assert_eq!(
                bytes,
                content_for(application.id.as_str(), language.as_str()).into_bytes()
            );
        }
    }
}

#[test]
fn applet_files_for_every_listed_language() {
    let (_temp, root) = temp_root();
    let app = app(&root, happy_api(&["en", "de"]), 1);

    let report = app.generate(GenerateTarget::Applets);
    assert!(report.is_success());

    let layout = CacheLayout::new(root.clone());
    for code in ["en", "de"] {
        let language: Language = code.parse().unwrap();
        let bytes = fs::read(layout.applet_path(&language).as_std_path()).unwrap();
        assert_eq!(bytes, content_for("JSM2_MemberApplet", code).into_bytes());
    }
}

#[test]
fn generating_twice_yields_identical_files() {
    let (_temp, root) = temp_root();
    let app = app(&root, happy_api(&["en", "de"]), 1);
    let layout = CacheLayout::new(root.clone());
    let portal_en = layout.application_path(&"portal".parse().unwrap(), &"en".parse().unwrap());
    let flash_de = layout.applet_path(&"de".parse().unwrap());

    app.generate(GenerateTarget::All);
    let first = (
        fs::read(portal_en.as_std_path()).unwrap(),
        fs::read(flash_de.as_std_path()).unwrap(),
    );
    app.generate(GenerateTarget::All);
    let second = (
        fs::read(portal_en.as_std_path()).unwrap(),
        fs::read(flash_de.as_std_path()).unwrap(),
    );
    assert_eq!(first, second);
}

#[test]
fn failing_language_does_not_stop_siblings() {
    let (_temp, root) = temp_root();
    let respond = |request: &lang_cache::api::ApiRequest| {
        if param(request, "language") == "hu" {
            return json!({
                "status": "ERROR",
                "data": "no such language",
                "error_type": "language",
                "error_code": "404"
            });
        }
        happy_api(&["en"])(request)
    };
    let app = app(&root, respond, 1);

    let report = app.generate(GenerateTarget::Applications);
    assert_eq!(report.succeeded_count(), 2);
    assert_eq!(report.failed_count(), 1);
    let failure = &report.failed[0];
    assert_eq!(failure.subject, "portal");
    assert_eq!(failure.language.as_deref(), Some("hu"));
    assert_eq!(failure.kind, FailureKind::Remote);
    assert!(failure.reason.contains("Type(language) Code(404)"));

    let layout = CacheLayout::new(root.clone());
    let portal = "portal".parse().unwrap();
    assert!(!layout.application_path(&portal, &"hu".parse().unwrap()).exists());
    assert!(layout.application_path(&portal, &"en".parse().unwrap()).exists());
    assert!(
        layout
            .application_path(&"member".parse().unwrap(), &"de".parse().unwrap())
            .exists()
    );
}

#[test]
fn failed_language_keeps_previous_cached_file() {
    let (_temp, root) = temp_root();
    let layout = CacheLayout::new(root.clone());
    let stale = layout.application_path(&"member".parse().unwrap(), &"de".parse().unwrap());
    fs::create_dir_all(stale.parent().unwrap().as_std_path()).unwrap();
    fs::write(stale.as_std_path(), b"stale").unwrap();

    let app = app(&root, |_request: &lang_cache::api::ApiRequest| ok(Value::Bool(false)), 1);
    let report = app.generate(GenerateTarget::Applications);

    assert_eq!(report.succeeded_count(), 0);
    assert_eq!(fs::read(stale.as_std_path()).unwrap(), b"stale");
}

#[test]
fn applet_without_languages_is_skipped() {
    let (_temp, root) = temp_root();
    let respond = |request: &lang_cache::api::ApiRequest| {
        if request.action() == "getAppletLanguages" && param(request, "applet") == "Empty_Applet" {
            return ok(json!([]));
        }
        happy_api(&["en"])(request)
    };
    let pipeline = Pipeline::new(
        LanguageApiClient::new(MockTransport::new(respond)),
        FileWriter::default(),
        CacheLayout::new(root.clone()),
    );
    let applets = vec![
        AppletEntry {
            directory: "empty".to_string(),
            id: "Empty_Applet".parse().unwrap(),
        },
        default_applets().remove(0),
    ];
    let app = App::new(pipeline, Vec::new(), applets);

    let report = app.generate(GenerateTarget::Applets);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].kind, FailureKind::Configuration);
    assert_eq!(report.failed[0].language, None);
    assert_eq!(report.succeeded_count(), 1);
    assert!(root.join("cache/flash/lang_en.xml").exists());
}

#[test]
fn applet_language_listing_failure_is_recorded() {
    let (_temp, root) = temp_root();
    let app = app(
        &root,
        |_request: &lang_cache::api::ApiRequest| json!({"status": "ERROR", "data": "down"}),
        1,
    );

    let report = app.generate(GenerateTarget::Applets);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].kind, FailureKind::Remote);
    assert!(report.failed[0].reason.contains("JSM2_MemberApplet"));
}

#[test]
fn dispatch_calls_only_the_selected_generator() {
    let (_temp, root) = temp_root();
    let app = app(&root, happy_api(&["en"]), 1);

    assert!(matches!(
        app.generator(GenerateTarget::Applications),
        Generator::Applications(_)
    ));
    app.generate(GenerateTarget::Applications);
    let actions = app.pipeline().client().transport().actions();
    assert!(!actions.is_empty());
    assert!(actions.iter().all(|action| action == "getLanguageFile"));
    assert!(!root.join("cache/flash").exists());
}

#[test]
fn parallel_run_matches_sequential_outcome() {
    let (_temp, root) = temp_root();
    let respond = |request: &lang_cache::api::ApiRequest| {
        if param(request, "language") == "hu" {
            return Value::Bool(false);
        }
        happy_api(&["en", "de", "fr"])(request)
    };
    let app = app(&root, respond, 4);

    let report = app.generate(GenerateTarget::All);
    assert_eq!(report.succeeded_count(), 5);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].language.as_deref(), Some("hu"));
    for code in ["en", "de", "fr"] {
        assert!(root.join(format!("cache/flash/lang_{code}.xml")).exists());
    }
}
