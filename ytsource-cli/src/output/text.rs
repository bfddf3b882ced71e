//! Text output formatting with colors.

use ytsource_core::LoadRequest;
use ytsource_manager::Route;
use ytsource_store::SourceConfig;

use super::json::RouteOutput;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the routing result for one identifier.
    pub fn format_route(&self, output: &RouteOutput) -> String {
        let mut lines = vec![self.bold(&output.identifier)];

        if let Some(error) = &output.error {
            lines.push(format!("  {} {}", self.paint(RED, "✗"), error));
        } else if let Some(url) = &output.probe_url {
            lines.push(format!(
                "  {} redirect probe {}",
                self.paint(YELLOW, "→"),
                url
            ));
            lines.push(self.paint(DIM, "    (use --resolve to follow it)"));
        } else if let Some(route) = &output.route {
            lines.extend(self.route_lines(route));
        }

        lines.join("\n")
    }

    fn route_lines(&self, route: &Route) -> Vec<String> {
        match route {
            Route::Unroutable => vec![format!("  {} unroutable", self.paint(DIM, "·"))],
            Route::Empty => vec![format!("  {} no track", self.paint(YELLOW, "∅"))],
            Route::Load(request) => {
                let mut lines = vec![format!(
                    "  {} {}",
                    self.paint(GREEN, "✓"),
                    self.paint(CYAN, request.operation())
                )];
                lines.extend(
                    request_fields(request)
                        .into_iter()
                        .map(|(name, value)| format!("    {name:<10} {value}")),
                );
                lines
            }
        }
    }

    /// Formats the configuration.
    pub fn format_config(&self, config: &SourceConfig) -> String {
        let mut lines = vec![self.bold("ytsource Configuration"), "─".repeat(40), String::new()];

        lines.push(format!("Allow search:              {}", config.allow_search));
        lines.push(format!("Allow direct video ids:    {}", config.allow_direct_video_ids));
        lines.push(format!("Allow direct playlist ids: {}", config.allow_direct_playlist_ids));
        lines.push(format!("Playlist page count:       {}", config.playlist_page_count));
        lines.push(String::new());

        lines.push("Clients:".to_string());
        for (index, client) in config.clients.iter().enumerate() {
            lines.push(format!("  {}. {client}", index + 1));
        }
        lines.push(String::new());

        let proxy = config.proxy.as_ref().map_or_else(
            || "none".to_string(),
            |p| format!("{}://{}:{}", p.scheme(), p.host_str().unwrap_or(""), p.port_or_known_default().unwrap_or(0)),
        );
        lines.push(format!("Proxy:           {proxy}"));
        lines.push(format!(
            "OAuth:           {}{}",
            if config.oauth.enabled { "enabled" } else { "disabled" },
            if config.oauth.refresh_token.is_some() { " (token stored)" } else { "" }
        ));
        lines.push(format!(
            "HTTP timeouts:   {}s total, {}s connect",
            config.http.timeout_secs, config.http.connect_timeout_secs
        ));

        lines.join("\n")
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn request_fields(request: &LoadRequest) -> Vec<(&'static str, String)> {
    match request {
        LoadRequest::Video { video_id } => vec![("video", video_id.clone())],
        LoadRequest::Playlist {
            playlist_id,
            selected_video_id,
        } => {
            let mut fields = vec![("playlist", playlist_id.clone())];
            if let Some(video_id) = selected_video_id {
                fields.push(("selected", video_id.clone()));
            }
            fields
        }
        LoadRequest::Mix { mix_id, video_id } => {
            vec![("mix", mix_id.clone()), ("seed", video_id.clone())]
        }
        LoadRequest::Search { query } | LoadRequest::MusicSearch { query } => {
            vec![("query", query.clone())]
        }
    }
}
