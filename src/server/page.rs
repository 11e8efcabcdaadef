//! HTML page served at `/`
//!
//! Two layouts share one frame list: [`ViewerMode::Browse`] renders a
//! dropdown, [`ViewerMode::Player`] renders play/pause, step buttons, a slider
//! and a speed select. Both embed the list as `const FRAMES = [...];` so the
//! script and `/api/files` always carry the same paths.

use const_format::concatcp;

use crate::config::{ViewerConfig, ViewerMode};
use crate::index::Frame;
use crate::playback::script::{
    CAN_NEXT, CAN_PLAY, CAN_PREV, INTERVAL_VALID, SEEK_IN_RANGE, TICK_TARGET,
};
use crate::playback::{INTERVAL_PRESETS, Playback};

/// Paths shown in the player's file list before collapsing the rest
const FILE_LIST_PREVIEW: usize = 10;

/// Marker text rendered when the sequence is empty
pub const NO_FRAMES_TEXT: &str = "No frames found";

#[derive(Debug, Clone)]
pub struct PageOptions {
    pub mode: ViewerMode,
    pub title: String,
    pub interval_ms: u32,
}

impl PageOptions {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            mode: config.mode,
            title: config.title.clone(),
            interval_ms: config.interval_ms,
        }
    }
}

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 20px; background: #f0f0f0; }
.container { max-width: 1400px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; }
.controls, .info { margin: 10px 0; padding: 15px; background: #e8e8e8; border-radius: 5px; }
button { padding: 8px 15px; margin: 5px; border: none; border-radius: 4px; cursor: pointer; color: white; }
.play { background: #4CAF50; }
.pause { background: #f44336; }
.nav { background: #2196F3; }
input[type="range"] { width: 300px; }
select { padding: 5px; margin: 5px; }
.file-list { max-height: 200px; overflow-y: auto; border: 1px solid #ccc; padding: 10px; font-family: monospace; }
#frameDisplay { border: 2px solid #ccc; background: white; display: flex; justify-content: center;
  align-items: center; min-height: 500px; height: 600px; overflow: hidden; padding: 20px; box-sizing: border-box; }
#frameDisplay svg, #frameDisplay img { max-width: 100%; max-height: 100%; width: auto; height: auto; }
"#;

// Shared by both layouts: fetch a frame and put it in #frameDisplay.
// Paths arrive percent-encoded and are fetched as they are.
const COMMON_JS: &str = r#"
const display = document.getElementById('frameDisplay');

function showMessage(text) {
    display.replaceChildren();
    const p = document.createElement('p');
    p.textContent = text;
    display.appendChild(p);
}

function showFrame(path) {
    if (!/\.svg$/i.test(path)) {
        const img = document.createElement('img');
        img.src = path;
        img.alt = path;
        display.replaceChildren(img);
        return;
    }
    fetch(path)
        .then(response => {
            if (!response.ok) { throw new Error('HTTP ' + response.status); }
            return response.text();
        })
        .then(text => {
            display.innerHTML = text;
            const svg = display.querySelector('svg');
            if (svg) {
                const w = svg.getAttribute('width');
                const h = svg.getAttribute('height');
                if (!svg.getAttribute('viewBox') && w && h) {
                    svg.setAttribute('viewBox', '0 0 ' + parseFloat(w) + ' ' + parseFloat(h));
                }
                svg.removeAttribute('width');
                svg.removeAttribute('height');
            }
        })
        .catch(error => showMessage('Loading failed: ' + error));
}
"#;

const BROWSE_JS: &str = r#"
function loadSelected() {
    const select = document.getElementById('fileSelect');
    if (select.value) {
        showFrame(select.value);
    }
}
"#;

// Guards come from playback::script
const PLAYER_JS: &str = concatcp!(
    r#"
let current = 0;
let timer = null;

function loadFrame(index) {
    if (!("#,
    SEEK_IN_RANGE,
    r#")) { return; }
    current = index;
    showFrame(FRAMES[index]);
    document.getElementById('frameSlider').value = index;
    document.getElementById('frameInfo').textContent = 'Frame ' + (index + 1) + ' / ' + FRAMES.length;
    document.getElementById('frameLabel').textContent = LABELS[index];
}

function tick() {
    loadFrame("#,
    TICK_TARGET,
    r#");
}

function stopTimer() {
    if (timer !== null) {
        clearInterval(timer);
        timer = null;
    }
}

function startTimer() {
    stopTimer();
    timer = setInterval(tick, interval);
}

function updatePlayButton() {
    const btn = document.getElementById('playBtn');
    btn.textContent = timer !== null ? 'Pause Animation' : 'Play Animation';
    btn.className = timer !== null ? 'pause' : 'play';
}

function togglePlay() {
    if (!("#,
    CAN_PLAY,
    r#")) { return; }
    if (timer !== null) { stopTimer(); } else { startTimer(); }
    updatePlayButton();
}

function nextFrame() {
    if ("#,
    CAN_NEXT,
    r#") { loadFrame(current + 1); }
}

function prevFrame() {
    if ("#,
    CAN_PREV,
    r#") { loadFrame(current - 1); }
}

function goToFrame(value) {
    const index = parseInt(value, 10);
    if (Number.isInteger(index)) { loadFrame(index); }
}

function changeSpeed() {
    const ms = parseInt(document.getElementById('speedSelect').value, 10);
    if (!("#,
    INTERVAL_VALID,
    r#")) { return; }
    interval = ms;
    if (timer !== null) { startTimer(); }
}

// The slider and the speed select handle their own arrow keys
document.addEventListener('keydown', function(event) {
    const tag = event.target ? event.target.tagName : '';
    if (tag === 'SELECT' || tag === 'INPUT') { return; }
    switch (event.code) {
        case 'Space': event.preventDefault(); togglePlay(); break;
        case 'ArrowLeft': prevFrame(); break;
        case 'ArrowRight': nextFrame(); break;
    }
});

if (FRAMES.length > 0) {
    loadFrame(0);
} else {
    showMessage('No frames found');
}
"#
);

/// Render the full page for the given sequence.
pub fn render_page(frames: &[Frame], options: &PageOptions) -> String {
    let title = escape_html(&options.title);
    let mut html = String::with_capacity(16 * 1024 + frames.len() * 128);

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>{title}</title>\n<meta charset=\"utf-8\">\n<style>{STYLE}</style>\n</head>\n<body>\n<div class=\"container\">\n<h1>{title}</h1>\n"
    ));

    if frames.is_empty() {
        html.push_str(&format!("<p class=\"count\" data-count=\"0\">{}</p>\n", NO_FRAMES_TEXT));
    } else {
        html.push_str(&format!(
            "<p class=\"count\" data-count=\"{n}\">Total snapshots found: <strong>{n}</strong></p>\n",
            n = frames.len()
        ));
    }

    match options.mode {
        ViewerMode::Browse => render_browse(&mut html, frames),
        ViewerMode::Player => render_player(&mut html, frames, options.interval_ms),
    }

    html.push_str("</div>\n<script>\n");
    html.push_str(&format!("const FRAMES = {};\n", frames_literal(frames)));
    html.push_str(&format!("const LABELS = {};\n", labels_literal(frames)));
    if options.mode == ViewerMode::Player {
        html.push_str(&format!("let interval = {};\n", options.interval_ms));
    }
    html.push_str(COMMON_JS);
    html.push_str(match options.mode {
        ViewerMode::Browse => BROWSE_JS,
        ViewerMode::Player => PLAYER_JS,
    });
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn render_browse(html: &mut String, frames: &[Frame]) {
    html.push_str("<label for=\"fileSelect\">Select Time Step:</label>\n");
    html.push_str("<select id=\"fileSelect\" onchange=\"loadSelected()\">\n");
    html.push_str("<option value=\"\">-- Select File --</option>\n");
    for (ordinal, frame) in frames.iter().enumerate() {
        html.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            escape_html(&frame.request_path),
            escape_html(&frame.label(ordinal))
        ));
    }
    html.push_str("</select>\n");

    html.push_str(&format!(
        "<div id=\"frameDisplay\"><p>{}</p></div>\n",
        if frames.is_empty() {
            NO_FRAMES_TEXT
        } else {
            "Select a time step to view it"
        }
    ));
}

fn render_player(html: &mut String, frames: &[Frame], interval_ms: u32) {
    let playback = Playback::new(frames.len(), interval_ms);
    let max = frames.len().saturating_sub(1);

    html.push_str("<div class=\"controls\">\n");
    html.push_str("<button id=\"playBtn\" class=\"play\" onclick=\"togglePlay()\">Play Animation</button>\n");
    html.push_str("<button class=\"nav\" onclick=\"prevFrame()\">Previous Frame</button>\n");
    html.push_str("<button class=\"nav\" onclick=\"nextFrame()\">Next Frame</button>\n<br>\n");
    html.push_str(&format!(
        "<label>Time Step: </label><input type=\"range\" id=\"frameSlider\" min=\"0\" max=\"{max}\" value=\"0\" oninput=\"goToFrame(this.value)\"><br>\n"
    ));
    html.push_str("<label>Playback Speed: </label>\n<select id=\"speedSelect\" onchange=\"changeSpeed()\">\n");
    let mut presets: Vec<(u32, String)> = INTERVAL_PRESETS
        .iter()
        .map(|(ms, label)| (*ms, label.to_string()))
        .collect();
    if !presets.iter().any(|(ms, _)| *ms == interval_ms) {
        presets.push((interval_ms, format!("Custom ({} ms/frame)", interval_ms)));
    }
    for (ms, label) in presets {
        let selected = if ms == playback.interval_ms() { " selected" } else { "" };
        html.push_str(&format!("<option value=\"{ms}\"{selected}>{label}</option>\n"));
    }
    html.push_str("</select>\n");
    html.push_str(&format!(
        "<span id=\"frameInfo\">{}</span> <span id=\"frameLabel\">{}</span>\n",
        playback.position_label(),
        frames.first().map(|f| escape_html(&f.label(0))).unwrap_or_default()
    ));
    html.push_str("</div>\n");

    html.push_str("<div id=\"frameDisplay\"><p>Loading...</p></div>\n");

    html.push_str("<div class=\"info\">\n<h3>File List</h3>\n<div class=\"file-list\">\n");
    if frames.is_empty() {
        html.push_str(&format!("<p>{}</p>\n", NO_FRAMES_TEXT));
    }
    for frame in frames.iter().take(FILE_LIST_PREVIEW) {
        html.push_str(&format!("&bull; {}<br>\n", escape_html(&frame.request_path)));
    }
    if frames.len() > FILE_LIST_PREVIEW {
        html.push_str(&format!("... and {} more files\n", frames.len() - FILE_LIST_PREVIEW));
    }
    html.push_str("</div>\n</div>\n");
}

/// JSON array of request paths, safe to place inside a `<script>` element.
fn frames_literal(frames: &[Frame]) -> String {
    let paths: Vec<&str> = frames.iter().map(|f| f.request_path.as_str()).collect();
    script_json(&paths)
}

fn labels_literal(frames: &[Frame]) -> String {
    let labels: Vec<String> = frames
        .iter()
        .enumerate()
        .map(|(ordinal, f)| f.label(ordinal))
        .collect();
    script_json(&labels)
}

fn script_json<T: serde::Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string());
    json.replace("</", "<\\/")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn frame(request_path: &str) -> Frame {
        let name = request_path.rsplit('/').next().unwrap().to_string();
        Frame {
            path: PathBuf::from(request_path.trim_start_matches('/')),
            request_path: request_path.to_string(),
            name,
        }
    }

    fn options(mode: ViewerMode) -> PageOptions {
        PageOptions {
            mode,
            title: "Viewer".to_string(),
            interval_ms: 500,
        }
    }

    fn embedded_frames(html: &str) -> Vec<String> {
        let marker = "const FRAMES = ";
        let start = html.find(marker).unwrap() + marker.len();
        let end = start + html[start..].find(";\n").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn test_browse_lists_every_frame() {
        let frames = vec![
            frame("/outputs/run/snapshot00000000.svg"),
            frame("/outputs/run/snapshot00000001.svg"),
        ];
        let html = render_page(&frames, &options(ViewerMode::Browse));

        assert!(html.contains(
            "<option value=\"/outputs/run/snapshot00000001.svg\">Step 2: snapshot00000001.svg</option>"
        ));
        assert!(html.contains("data-count=\"2\""));
        assert!(!html.contains("togglePlay"));
        assert_eq!(embedded_frames(&html).len(), 2);
    }

    #[test]
    fn test_player_controls_and_preview() {
        let frames: Vec<Frame> = (0..12)
            .map(|i| frame(&format!("/outputs/run/snapshot{:08}.svg", i)))
            .collect();
        let html = render_page(&frames, &options(ViewerMode::Player));

        assert!(html.contains("id=\"playBtn\""));
        assert!(html.contains("max=\"11\""));
        assert!(html.contains("<option value=\"500\" selected>"));
        assert!(html.contains("Frame 1 / 12"));
        assert!(html.contains("<span id=\"frameLabel\">Step 1: snapshot00000000.svg</span>"));
        assert!(html.contains("\"Step 12: snapshot00000011.svg\""));
        assert!(html.contains("... and 2 more files"));
        assert!(html.contains("let interval = 500;"));
    }

    #[test]
    fn test_player_script_follows_playback_rules() {
        let html = render_page(&[frame("/outputs/run/snapshot1.svg")], &options(ViewerMode::Player));

        for guard in [
            format!("if (!({SEEK_IN_RANGE})) {{ return; }}\n    current = index;"),
            format!("function tick() {{\n    loadFrame({TICK_TARGET});"),
            format!("if ({CAN_NEXT}) {{ loadFrame(current + 1); }}"),
            format!("if ({CAN_PREV}) {{ loadFrame(current - 1); }}"),
            format!("if (!({CAN_PLAY})) {{ return; }}\n    if (timer !== null)"),
            format!("if (!({INTERVAL_VALID})) {{ return; }}\n    interval = ms;"),
        ] {
            assert!(html.contains(&guard), "{guard}");
        }

        let browse = render_page(&[frame("/outputs/run/snapshot1.svg")], &options(ViewerMode::Browse));
        assert!(!browse.contains(TICK_TARGET));
    }

    #[test]
    fn test_arrow_keys_leave_form_controls_alone() {
        let html = render_page(&[frame("/outputs/run/snapshot1.svg")], &options(ViewerMode::Player));
        let handler = &html[html.find("addEventListener('keydown'").unwrap()..];
        let skip = handler.find("if (tag === 'SELECT' || tag === 'INPUT') { return; }").unwrap();
        assert!(skip < handler.find("case 'ArrowLeft'").unwrap());
    }

    #[test]
    fn test_custom_interval_is_selectable() {
        let mut opts = options(ViewerMode::Player);
        opts.interval_ms = 40;
        let html = render_page(&[frame("/outputs/run/snapshot1.svg")], &opts);
        assert!(html.contains("<option value=\"40\" selected>Custom (40 ms/frame)</option>"));
    }

    #[test]
    fn test_empty_sequence_renders_marker() {
        for mode in [ViewerMode::Browse, ViewerMode::Player] {
            let html = render_page(&[], &options(mode));
            assert!(html.contains(NO_FRAMES_TEXT));
            assert!(html.contains("data-count=\"0\""));
            assert!(embedded_frames(&html).is_empty());
        }
    }

    #[test]
    fn test_names_are_escaped() {
        let frames = vec![frame("/outputs/run/snapshot<b>&</script>.svg")];
        let mut opts = options(ViewerMode::Browse);
        opts.title = "A & B".to_string();
        let html = render_page(&frames, &opts);

        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("snapshot&lt;b&gt;&amp;&lt;/script&gt;.svg"));
        assert!(!html.contains("</script>.svg"));
        assert_eq!(embedded_frames(&html), vec!["/outputs/run/snapshot<b>&</script>.svg"]);
    }

    #[test]
    fn test_paths_are_fetched_verbatim() {
        let frames = vec![frame("/outputs/run%2541/snapshot%201%23.svg")];
        let html = render_page(&frames, &options(ViewerMode::Browse));

        assert!(html.contains("<option value=\"/outputs/run%2541/snapshot%201%23.svg\">"));
        assert!(html.contains("fetch(path)"));
        assert!(!html.contains("encodeURIComponent"));
    }
}
