//! 测试用的内存页面、启动器和 HTTP 客户端
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tempfile::TempDir;
use tokio::time::Instant;

use render_job_submit::browser::SessionLauncher;
use render_job_submit::clients::HttpFetch;
use render_job_submit::error::{BrowserError, FetchError};
use render_job_submit::{Config, EditorSurface, LocatorProfile};

pub const EDITOR_URL: &str = "https://editor.test/";
pub const PAGE_URL: &str = "https://editor.test/project/1";

/// 页面元素句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
struct Node {
    selector: String,
    text: String,
    attrs: HashMap<String, String>,
    fail_clicks: bool,
    visible_at: Option<Instant>,
    revealed_by: Option<NodeId>,
}

/// 页面上发生过的操作
#[derive(Debug, Default, Clone)]
pub struct Recorded {
    pub navigations: Vec<String>,
    pub clicks: Vec<NodeId>,
    pub typed: Vec<(NodeId, String)>,
    pub enter_presses: Vec<NodeId>,
    pub attached: Vec<Vec<PathBuf>>,
    pub closed: bool,
}

#[derive(Default)]
struct State {
    nodes: Vec<Node>,
    recorded: Recorded,
    fail_navigation: bool,
    cookie: Option<String>,
}

/// 内存页面：元素按"查询用的选择器字符串"登记
#[derive(Clone, Default)]
pub struct FakeSurface {
    state: Arc<Mutex<State>>,
}

pub struct NodeBuilder<'a> {
    surface: &'a FakeSurface,
    node: Node,
}

impl NodeBuilder<'_> {
    pub fn text(mut self, text: &str) -> Self {
        self.node.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.node.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn failing_clicks(mut self) -> Self {
        self.node.fail_clicks = true;
        self
    }

    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.node.visible_at = Some(Instant::now() + delay);
        self
    }

    pub fn revealed_by(mut self, trigger: NodeId) -> Self {
        self.node.revealed_by = Some(trigger);
        self
    }

    pub fn add(self) -> NodeId {
        let mut state = self.surface.state.lock().unwrap();
        state.nodes.push(self.node);
        NodeId(state.nodes.len() - 1)
    }
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, selector: &str) -> NodeBuilder<'_> {
        NodeBuilder {
            surface: self,
            node: Node {
                selector: selector.to_string(),
                text: String::new(),
                attrs: HashMap::new(),
                fail_clicks: false,
                visible_at: None,
                revealed_by: None,
            },
        }
    }

    pub fn fail_navigation(&self) {
        self.state.lock().unwrap().fail_navigation = true;
    }

    pub fn set_cookie(&self, cookie: &str) {
        self.state.lock().unwrap().cookie = Some(cookie.to_string());
    }

    pub fn recorded(&self) -> Recorded {
        self.state.lock().unwrap().recorded.clone()
    }

    pub fn clicks_on(&self, id: NodeId) -> usize {
        self.recorded().clicks.iter().filter(|c| **c == id).count()
    }

    pub fn typed_into(&self, id: NodeId) -> Vec<String> {
        self.recorded()
            .typed
            .into_iter()
            .filter(|(target, _)| *target == id)
            .map(|(_, text)| text)
            .collect()
    }

    fn with_node<R>(&self, id: NodeId, f: impl FnOnce(&Node) -> R) -> Result<R> {
        let state = self.state.lock().unwrap();
        state.nodes.get(id.0).map(f).ok_or_else(|| anyhow!("元素已失效"))
    }
}

fn is_visible(state: &State, node: &Node) -> bool {
    let timed = node.visible_at.map_or(true, |at| Instant::now() >= at);
    let revealed = node
        .revealed_by
        .map_or(true, |trigger| state.recorded.clicks.contains(&trigger));
    timed && revealed
}

#[async_trait]
impl EditorSurface for FakeSurface {
    type Element = NodeId;

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_navigation {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED"));
        }
        state.recorded.navigations.push(url.to_string());
        Ok(())
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn wait_for_navigation(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.selector == selector && is_visible(&state, node))
            .map(|(i, _)| NodeId(i))
            .collect())
    }

    async fn inner_text(&self, element: &NodeId) -> Result<String> {
        self.with_node(*element, |node| node.text.clone())
    }

    async fn attribute(&self, element: &NodeId, name: &str) -> Result<Option<String>> {
        self.with_node(*element, |node| node.attrs.get(name).cloned())
    }

    async fn click(&self, element: &NodeId) -> Result<()> {
        if self.with_node(*element, |node| node.fail_clicks)? {
            return Err(anyhow!("元素被遮挡"));
        }
        self.state.lock().unwrap().recorded.clicks.push(*element);
        Ok(())
    }

    async fn type_text(&self, element: &NodeId, text: &str) -> Result<()> {
        self.with_node(*element, |_| ())?;
        self.state
            .lock()
            .unwrap()
            .recorded
            .typed
            .push((*element, text.to_string()));
        Ok(())
    }

    async fn press_enter(&self, element: &NodeId) -> Result<()> {
        self.state.lock().unwrap().recorded.enter_presses.push(*element);
        Ok(())
    }

    async fn attach_files(&self, _element: &NodeId, files: &[PathBuf]) -> Result<()> {
        self.state.lock().unwrap().recorded.attached.push(files.to_vec());
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>> {
        Ok(Some(PAGE_URL.to_string()))
    }

    async fn cookie_header(&self) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().cookie.clone())
    }

    async fn close(self) -> Result<()> {
        self.state.lock().unwrap().recorded.closed = true;
        Ok(())
    }
}

/// 完整编辑器界面中各控件的句柄
pub struct EditorIds {
    pub new_project: NodeId,
    pub upload: NodeId,
    pub file_input: NodeId,
    pub thumbnails: Vec<NodeId>,
    pub text_panel: NodeId,
    pub add_text: NodeId,
    pub text_surface: NodeId,
    pub export: NodeId,
    pub completion: NodeId,
}

/// 按默认定位配置搭建一个控件齐全的编辑器（已登录状态）
///
/// 完成标志在 `completion_after` 之后出现，带 `href`
pub fn full_editor(surface: &FakeSurface, completion_after: Duration, href: &str) -> EditorIds {
    let p = LocatorProfile::default();
    let clickable = p.new_project.0[0].scope();

    EditorIds {
        new_project: surface.node(clickable).text("New project").add(),
        upload: surface.node(clickable).text("Upload").add(),
        file_input: surface.node(p.file_input.0[0].scope()).add(),
        thumbnails: (0..3)
            .map(|_| surface.node(p.media_thumbnail.0[0].scope()).add())
            .collect(),
        text_panel: surface.node(clickable).text("Text").add(),
        add_text: surface.node(clickable).text("Add text").add(),
        text_surface: surface.node(p.active_text_surface.0[0].scope()).add(),
        export: surface.node(clickable).text("Export").add(),
        completion: surface
            .node(p.completion_indicator.0[0].scope())
            .attr("href", href)
            .appears_after(completion_after)
            .add(),
    }
}

/// 可克隆的内存 HTTP 客户端，记录所有请求
#[derive(Clone, Default)]
pub struct FakeFetcher {
    responses: Arc<Mutex<HashMap<String, Result<Vec<u8>, u16>>>>,
    requests: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(self, url: &str, body: &[u8]) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.to_vec()));
        self
    }

    pub fn fail(self, url: &str, status: u16) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(status));
        self
    }

    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetch for FakeFetcher {
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> Result<Vec<u8>, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), cookie.map(str::to_string)));

        match self.responses.lock().unwrap().get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchError::Status { status: *status }),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

/// 返回同一个内存页面的启动器，记录启动次数
pub struct FakeLauncher {
    surface: FakeSurface,
    launches: AtomicUsize,
    fail: bool,
}

impl FakeLauncher {
    pub fn new(surface: FakeSurface) -> Self {
        Self {
            surface,
            launches: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(FakeSurface::new())
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    type Surface = FakeSurface;

    async fn launch(&self, _config: &Config) -> Result<FakeSurface, BrowserError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BrowserError::LaunchFailed("chrome not found".to_string()));
        }
        Ok(self.surface.clone())
    }
}

/// 临时工作目录 + 写好的任务文件
pub fn workspace(payload: &str) -> (TempDir, Config) {
    let tmp = TempDir::new().unwrap();
    let payload_path = tmp.path().join("job.json");
    std::fs::write(&payload_path, payload).unwrap();

    let config = Config {
        editor_url: EDITOR_URL.to_string(),
        payload_path,
        work_dir: tmp.path().join("work"),
        ..Config::default()
    };
    (tmp, config)
}
