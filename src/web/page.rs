use crate::detection::DetectionReport;

const STYLE: &str = "body{background:#0a0a1a;color:#fff;font-family:monospace;\
max-width:760px;margin:2em auto;text-align:center}\
.panel{background:#1a1a2e;border:2px solid #3a3a5c;padding:1em;margin:1em 0}\
.ok{color:#00ff88}.warn{color:#ffaa00}.err{color:#ff4444}img{max-width:100%}\
ul{list-style:none;padding:0}";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <title>AstroGuard</title><style>{}</style></head><body>\
         <h1>AstroGuard: Space Station Object Detector</h1>{}</body></html>",
        STYLE, body
    )
}

fn upload_panel() -> &'static str {
    "<div class=\"panel\"><form action=\"/detect\" method=\"post\" enctype=\"multipart/form-data\">\
     <input type=\"file\" name=\"image\" accept=\".png,.jpg,.jpeg,.bmp,.tif,.tiff\" required> \
     <button type=\"submit\">Scan</button></form></div>"
}

pub fn upload_form() -> String {
    layout(&format!(
        "<p>Upload an image and we'll detect Fire Extinguisher, ToolBox, \
         or OxygenTank using our AI model.</p>{}",
        upload_panel()
    ))
}

/// `png_base64` is the annotated image, PNG encoded
pub fn result_page(file_name: &str, report: &DetectionReport, png_base64: &str) -> String {
    let class = if report.summary.is_empty() { "warn" } else { "ok" };
    let items: String = report
        .detections
        .iter()
        .map(|d| format!("<li>{}</li>", escape(&d.label())))
        .collect();

    layout(&format!(
        "<div class=\"panel\"><img alt=\"{name}\" src=\"data:image/png;base64,{png}\">\
         <p>Detected Objects in {name}</p>\
         <p class=\"{class}\">{headline}</p><ul>{items}</ul></div>{form}",
        name = escape(file_name),
        png = png_base64,
        class = class,
        headline = escape(&report.summary.headline()),
        items = items,
        form = upload_panel(),
    ))
}

pub fn error_page(message: &str) -> String {
    layout(&format!(
        "<div class=\"panel\"><p class=\"err\">DETECTION FAILED: {}</p></div>{}",
        escape(message),
        upload_panel()
    ))
}
