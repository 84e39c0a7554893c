use std::time::Duration;

use forms_answer::browser::connect_to_browser_and_page;
use forms_answer::document::{DocumentSurface, PageDocument};
use forms_answer::services::locate_all;
use forms_answer::{logger, App, Config, JsExecutor};

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    logger::init(true);

    let config = Config::from_env().expect("配置无效");
    let result =
        connect_to_browser_and_page(config.browser_debug_port, Some(&config.target_url), None)
            .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_snapshot_live_page() {
    logger::init(true);

    let config = Config::from_env().expect("配置无效");
    let (_browser, page) =
        connect_to_browser_and_page(config.browser_debug_port, Some(&config.target_url), None)
            .await
            .expect("连接浏览器失败");

    let document = PageDocument::new(JsExecutor::new(page));
    document
        .wait_until_ready(Duration::from_millis(200), Duration::from_secs(30))
        .await
        .expect("页面未就绪");

    let root = document.snapshot().await.expect("读取快照失败");
    let units = locate_all(&root);
    println!("找到 {} 个题目节点", units.len());
}

#[tokio::test]
#[ignore]
async fn test_run_once_against_live_page() {
    logger::init(true);

    let config = Config::from_env().expect("配置无效");
    let report = App::initialize(config)
        .await
        .expect("初始化失败")
        .run()
        .await
        .expect("运行失败");

    println!("{:?}", report);
}
