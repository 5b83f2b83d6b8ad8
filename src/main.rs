mod auth;
mod clipboard;
mod config;
mod controller;
mod error;
mod launch;
mod platform;
mod service;
mod session;
mod substitution;
mod translation;
mod view;
mod workflow;

use std::num::NonZeroU32;

use controller::{Controller, LibraryLoad};
use error::AssistError;
use glow::HasContext;
use glutin::config::ConfigTemplateBuilder;
use glutin::context::{ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::prelude::GlSurface;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::DisplayBuilder;
use imgui_glow_renderer::AutoRenderer;
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use launch::LaunchParams;
use log::{info, warn};
use raw_window_handle::HasWindowHandle;
use session::SessionPhase;
use view::{BannerLevel, Collapsible, Pane, Purpose, ResponseEntry, ResultsPanel, ViewModel};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowAttributes};

const THEMES: &[&str] = &["Dark", "Light", "Classic"];

const CUSTOMER_COLOR: [f32; 4] = [0.55, 0.75, 1.0, 1.0];
const AGENT_COLOR: [f32; 4] = [0.6, 0.85, 0.6, 1.0];
const ERROR_COLOR: [f32; 4] = [1.0, 0.35, 0.35, 1.0];
const WARNING_COLOR: [f32; 4] = [1.0, 0.8, 0.2, 1.0];
const INFO_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

/// Agent actions collected while drawing a frame, applied afterwards.
enum UiAction {
    ToggleIframe,
    ToggleSearch,
    Search,
    Send,
    Copy,
    Insert(String),
    Toggle(Collapsible),
    DismissBanner,
    Retry,
}

// ─── App State ───────────────────────────────────────────────────────

struct AppState {
    config: config::AppConfig,
    controller: Controller,

    // Settings UI
    settings_open: bool,
    settings_status: String,
    available_fonts: Vec<config::FontEntry>,
    font_changed: bool,
    theme_changed: bool,
}

// ─── App (owns GL + imgui state) ─────────────────────────────────────

struct App {
    window: Option<Window>,
    gl_config: Option<glutin::config::Config>,
    gl_context: Option<PossiblyCurrentContext>,
    gl_surface: Option<Surface<WindowSurface>>,
    glow_context: Option<glow::Context>,
    imgui: Option<imgui::Context>,
    platform: Option<WinitPlatform>,
    renderer: Option<AutoRenderer>,
    state: AppState,
}

impl App {
    fn new(launch: Result<LaunchParams, AssistError>) -> Self {
        let cfg = config::AppConfig::load();
        let available_fonts = config::discover_system_fonts();

        let mut controller = Controller::start(&cfg, launch);
        controller.initialize();

        Self {
            window: None,
            gl_config: None,
            gl_context: None,
            gl_surface: None,
            glow_context: None,
            imgui: None,
            platform: None,
            renderer: None,
            state: AppState {
                config: cfg,
                controller,
                settings_open: false,
                settings_status: String::new(),
                available_fonts,
                font_changed: false,
                theme_changed: false,
            },
        }
    }

    /// Rebuild the imgui font atlas with the current config settings.
    fn rebuild_fonts(&mut self) {
        let Some(imgui) = self.imgui.as_mut() else {
            return;
        };
        let Some(gl_config) = self.gl_config.as_ref() else {
            return;
        };

        imgui.fonts().clear();
        load_font(
            imgui,
            &self.state.config.font_name,
            &self.state.available_fonts,
            self.state.config.font_size,
        );

        let gl_display = gl_config.display();
        let new_glow = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };

        // Drop old renderer before creating new one.
        self.renderer = None;
        self.renderer = Some(
            AutoRenderer::new(new_glow, imgui).expect("Failed to recreate renderer"),
        );
        info!("Font atlas rebuilt");
    }
}

// ─── Font / theme helpers ────────────────────────────────────────────

fn load_font(
    imgui: &mut imgui::Context,
    font_name: &str,
    fonts: &[config::FontEntry],
    size: f32,
) {
    let font_path = fonts
        .iter()
        .find(|f| f.name == font_name)
        .map(|f| f.path.as_str());

    // Fallback list if saved font not found.
    let fallback = [
        "C:\\Windows\\Fonts\\segoeui.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ];

    let path = font_path.or_else(|| {
        fallback
            .iter()
            .find(|p| std::path::Path::new(p).exists())
            .copied()
    });

    if let Some(path) = path {
        if let Ok(font_data) = std::fs::read(path) {
            let font_data: &'static [u8] = Vec::leak(font_data);
            // Customer mail arrives in any script; cover the common ranges.
            imgui.fonts().add_font(&[imgui::FontSource::TtfData {
                data: font_data,
                size_pixels: size,
                config: Some(imgui::FontConfig {
                    glyph_ranges: imgui::FontGlyphRanges::from_slice(&[
                        0x0020, 0x00FF, // Basic Latin + Latin-1
                        0x0100, 0x024F, // Latin Extended
                        0x0370, 0x03FF, // Greek
                        0x0400, 0x052F, // Cyrillic
                        0x2000, 0x206F, // Punctuation
                        0x20A0, 0x20CF, // Currency
                        0,
                    ]),
                    ..Default::default()
                }),
            }]);
            info!("Loaded font: {} (size {:.0})", path, size);
            return;
        }
    }

    warn!("Failed to load font '{}', using imgui default", font_name);
}

fn apply_theme(imgui: &mut imgui::Context, theme: &str) {
    let style = imgui.style_mut();
    match theme {
        "Light" => style.use_light_colors(),
        "Classic" => style.use_classic_colors(),
        _ => style.use_dark_colors(),
    };
}

fn phase_label(phase: &SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Unauthenticated => "Not signed in",
        SessionPhase::Authenticating => "Signing in",
        SessionPhase::SessionLoaded => "Conversation loaded",
        SessionPhase::Ready => "Ready",
        SessionPhase::Errored(_) => "Error",
    }
}

// ─── ApplicationHandler ──────────────────────────────────────────────

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title("Agent Assist Translator")
            .with_inner_size(winit::dpi::LogicalSize::new(560.0f32, 780.0));

        let config_template = ConfigTemplateBuilder::new();
        let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attrs));

        let (window, gl_config) = display_builder
            .build(event_loop, config_template, |mut configs| {
                configs.next().expect("No GL config available")
            })
            .expect("Failed to build display");

        let window = window.expect("Failed to create window");
        let gl_display = gl_config.display();
        let context_attrs = ContextAttributesBuilder::new().build(Some(
            window
                .window_handle()
                .expect("Failed to get window handle")
                .into(),
        ));

        let gl_context = unsafe {
            gl_display
                .create_context(&gl_config, &context_attrs)
                .expect("Failed to create GL context")
        };

        let size = window.inner_size();
        let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window
                .window_handle()
                .expect("Failed to get window handle")
                .into(),
            NonZeroU32::new(size.width.max(1)).expect("non-zero width"),
            NonZeroU32::new(size.height.max(1)).expect("non-zero height"),
        );

        let gl_surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &surface_attrs)
                .expect("Failed to create GL surface")
        };

        let gl_context = gl_context
            .make_current(&gl_surface)
            .expect("Failed to make GL context current");

        let _ = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN));

        let glow_context = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };

        let mut imgui = imgui::Context::create();

        if let Some(backend) = clipboard::ImguiClipboardBackend::new() {
            imgui.set_clipboard_backend(backend);
        }

        imgui.set_ini_filename(Some(config::config_dir().join("imgui_layout.ini")));

        load_font(
            &mut imgui,
            &self.state.config.font_name,
            &self.state.available_fonts,
            self.state.config.font_size,
        );
        apply_theme(&mut imgui, &self.state.config.theme);

        let mut platform = WinitPlatform::new(&mut imgui);
        platform.attach_window(imgui.io_mut(), &window, HiDpiMode::Default);

        let renderer =
            AutoRenderer::new(glow_context, &mut imgui).expect("Failed to create renderer");

        let glow_context = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };

        self.window = Some(window);
        self.gl_config = Some(gl_config);
        self.gl_context = Some(gl_context);
        self.gl_surface = Some(gl_surface);
        self.glow_context = Some(glow_context);
        self.imgui = Some(imgui);
        self.platform = Some(platform);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let (Some(window), Some(imgui), Some(platform)) = (
            self.window.as_ref(),
            self.imgui.as_mut(),
            self.platform.as_mut(),
        ) {
            platform.handle_event::<()>(
                imgui.io_mut(),
                window,
                &winit::event::Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                },
            );
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(gl_surface), Some(gl_context)) =
                    (self.gl_surface.as_ref(), self.gl_context.as_ref())
                {
                    gl_surface.resize(
                        gl_context,
                        NonZeroU32::new(new_size.width.max(1)).expect("non-zero width"),
                        NonZeroU32::new(new_size.height.max(1)).expect("non-zero height"),
                    );
                }
                if let Some(w) = self.window.as_ref() {
                    w.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                if self.state.font_changed {
                    self.rebuild_fonts();
                    self.state.font_changed = false;
                }
                if self.state.theme_changed {
                    if let Some(imgui) = self.imgui.as_mut() {
                        apply_theme(imgui, &self.state.config.theme);
                    }
                    self.state.theme_changed = false;
                }

                let (
                    Some(window),
                    Some(imgui),
                    Some(platform),
                    Some(renderer),
                    Some(gl_context),
                    Some(gl_surface),
                    Some(glow_ctx),
                ) = (
                    self.window.as_ref(),
                    self.imgui.as_mut(),
                    self.platform.as_mut(),
                    self.renderer.as_mut(),
                    self.gl_context.as_ref(),
                    self.gl_surface.as_ref(),
                    self.glow_context.as_ref(),
                )
                else {
                    return;
                };

                // ── Apply service events (non-blocking) ──────────
                let state = &mut self.state;
                state.controller.poll();

                platform
                    .prepare_frame(imgui.io_mut(), window)
                    .expect("Failed to prepare frame");

                let ui = imgui.frame();
                let mut actions: Vec<UiAction> = Vec::new();
                let display_size = ui.io().display_size;

                // ── AppBar ────────────────────────────────────────
                let mut appbar_height = 35.0_f32;
                ui.window("##appbar")
                    .position([0.0, 0.0], imgui::Condition::Always)
                    .size([display_size[0], 0.0], imgui::Condition::Always)
                    .flags(
                        imgui::WindowFlags::NO_TITLE_BAR
                            | imgui::WindowFlags::NO_RESIZE
                            | imgui::WindowFlags::NO_MOVE
                            | imgui::WindowFlags::NO_SCROLLBAR
                            | imgui::WindowFlags::NO_COLLAPSE
                            | imgui::WindowFlags::NO_SAVED_SETTINGS
                            | imgui::WindowFlags::ALWAYS_AUTO_RESIZE,
                    )
                    .build(|| {
                        let view = &state.controller.view;
                        ui.disabled(view.is_blocked(), || {
                            if ui.button(view.toggle_label()) {
                                actions.push(UiAction::ToggleIframe);
                            }
                        });
                        ui.same_line();
                        if ui.button("Settings") {
                            state.settings_open = !state.settings_open;
                        }

                        let controller = &state.controller;
                        let status = format!(
                            "{}  |  reply language: {}",
                            phase_label(&controller.session.phase),
                            controller.source_language()
                        );
                        let status_w = ui.calc_text_size(&status)[0];
                        ui.same_line_with_pos(display_size[0] - status_w - 16.0);
                        ui.text_colored([0.7, 0.7, 0.3, 1.0], &status);

                        appbar_height = ui.window_size()[1];
                    });

                // ── Window: Settings ──────────────────────────────
                if state.settings_open {
                    let mut still_open = true;
                    ui.window("Settings")
                        .size([440.0, 0.0], imgui::Condition::FirstUseEver)
                        .opened(&mut still_open)
                        .build(|| draw_settings(ui, state));
                    if !still_open {
                        state.settings_open = false;
                    }
                }

                // ── Window: Panel ─────────────────────────────────
                ui.window("##panel")
                    .position([0.0, appbar_height], imgui::Condition::Always)
                    .size(
                        [display_size[0], display_size[1] - appbar_height],
                        imgui::Condition::Always,
                    )
                    .flags(
                        imgui::WindowFlags::NO_TITLE_BAR
                            | imgui::WindowFlags::NO_RESIZE
                            | imgui::WindowFlags::NO_MOVE
                            | imgui::WindowFlags::NO_COLLAPSE
                            | imgui::WindowFlags::NO_SAVED_SETTINGS
                            | imgui::WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS,
                    )
                    .build(|| {
                        let libraries_loading =
                            state.controller.library_load() == LibraryLoad::Loading;
                        let view = &mut state.controller.view;
                        if draw_banner(ui, view, &mut actions) {
                            return;
                        }
                        if let Some(busy) = &view.busy {
                            ui.text_disabled(busy);
                        }
                        ui.separator();

                        match view.pane {
                            Pane::Translator => draw_messages(ui, view),
                            Pane::CannedResponses => {
                                draw_canned_responses(ui, view, libraries_loading, &mut actions)
                            }
                        }

                        ui.separator();
                        draw_compose(ui, view, &mut actions);
                    });

                // ── Apply collected actions ──────────────────────
                let controller = &mut state.controller;
                for action in actions {
                    match action {
                        UiAction::ToggleIframe => controller.toggle_iframe(),
                        UiAction::ToggleSearch => controller.toggle_search(),
                        UiAction::Search => {
                            let query = controller.view.search_query.clone();
                            controller.search_response(&query);
                        }
                        UiAction::Send => controller.send_message(),
                        UiAction::Copy => controller.copy_to_clipboard(),
                        UiAction::Insert(id) => controller.insert_response(&id),
                        UiAction::Toggle(target) => controller.view.toggle_collapsible(&target),
                        UiAction::DismissBanner => controller.dismiss_banner(),
                        UiAction::Retry => controller.retry(),
                    }
                }

                let draw_data = imgui.render();

                unsafe {
                    glow_ctx.clear_color(0.1, 0.1, 0.1, 1.0);
                    glow_ctx.clear(glow::COLOR_BUFFER_BIT);
                }

                renderer.render(draw_data).expect("Failed to render");

                gl_surface
                    .swap_buffers(gl_context)
                    .expect("Failed to swap buffers");

                window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

// ─── Panel sections ──────────────────────────────────────────────────

/// Returns true when the banner blocks the rest of the panel.
fn draw_banner(ui: &imgui::Ui, view: &ViewModel, actions: &mut Vec<UiAction>) -> bool {
    let Some(banner) = &view.banner else {
        return false;
    };
    let color = match banner.level {
        BannerLevel::Error => ERROR_COLOR,
        BannerLevel::Warning => WARNING_COLOR,
        BannerLevel::Info => INFO_COLOR,
    };

    if banner.blocking {
        ui.text_colored(color, "The agent assist panel could not start.");
        ui.text_wrapped(&banner.text);
        ui.spacing();
        if ui.button("Retry") {
            actions.push(UiAction::Retry);
        }
        return true;
    }

    ui.text_colored(color, &banner.text);
    ui.same_line();
    if ui.small_button("Dismiss") {
        actions.push(UiAction::DismissBanner);
    }
    false
}

fn draw_messages(ui: &imgui::Ui, view: &mut ViewModel) {
    ui.child_window("##messages")
        .size([0.0, -170.0])
        .border(true)
        .build(|| {
            for (idx, msg) in view.messages.iter().enumerate() {
                let (label, color) = match msg.purpose {
                    Purpose::Customer => ("Customer (translated)", CUSTOMER_COLOR),
                    Purpose::Agent => ("Reply (translated)", AGENT_COLOR),
                };
                ui.text_colored(color, label);
                ui.text_wrapped(&msg.text);
                if ui.is_item_hovered() && ui.is_mouse_released(imgui::MouseButton::Right) {
                    ui.open_popup(format!("##msg_popup_{}", idx));
                }
                if let Some(_popup) = ui.begin_popup(format!("##msg_popup_{}", idx)) {
                    if ui.selectable("Copy") {
                        ui.set_clipboard_text(&msg.text);
                    }
                }
                ui.spacing();
            }
            if view.scroll_to_bottom {
                ui.set_scroll_here_y();
                view.scroll_to_bottom = false;
            }
        });
}

fn draw_canned_responses(
    ui: &imgui::Ui,
    view: &mut ViewModel,
    libraries_loading: bool,
    actions: &mut Vec<UiAction>,
) {
    let searched = ui
        .input_text("##find_response", &mut view.search_query)
        .hint("Search responses")
        .enter_returns_true(true)
        .build();
    ui.same_line();
    if ui.button("Find") || searched {
        actions.push(UiAction::Search);
    }
    ui.same_line();
    let toggle_label = match view.results_panel {
        ResultsPanel::Libraries => "Show Search Results",
        ResultsPanel::Search => "Show Libraries",
    };
    if ui.button(toggle_label) {
        actions.push(UiAction::ToggleSearch);
    }

    ui.child_window("##responses")
        .size([0.0, -170.0])
        .border(true)
        .build(|| match view.results_panel {
            ResultsPanel::Libraries => {
                if libraries_loading {
                    ui.text_disabled("Loading libraries...");
                } else if view.libraries.is_empty() {
                    ui.text_disabled("No libraries");
                }
                for library in &view.libraries {
                    if ui.button(format!("{}##library-{}", library.name, library.id)) {
                        actions.push(UiAction::Toggle(Collapsible::Library(library.id.clone())));
                    }
                    if library.expanded {
                        ui.indent();
                        for response in &library.responses {
                            draw_response(
                                ui,
                                response,
                                Collapsible::Response(response.id.clone()),
                                actions,
                            );
                        }
                        ui.unindent();
                    }
                }
            }
            ResultsPanel::Search => {
                if view.search_results.is_empty() {
                    ui.text_disabled("No search results");
                }
                for response in &view.search_results {
                    draw_response(
                        ui,
                        response,
                        Collapsible::SearchResult(response.id.clone()),
                        actions,
                    );
                }
            }
        });
}

fn draw_response(
    ui: &imgui::Ui,
    response: &ResponseEntry,
    target: Collapsible,
    actions: &mut Vec<UiAction>,
) {
    let kind = match target {
        Collapsible::SearchResult(_) => "search",
        _ => "response",
    };
    if ui.button(format!("{}##{}-{}", response.name, kind, response.id)) {
        actions.push(UiAction::Toggle(target));
    }
    if response.expanded {
        ui.text_wrapped(&response.preview);
        if ui.small_button(format!("Insert##insert-{}-{}", kind, response.id)) {
            actions.push(UiAction::Insert(response.id.clone()));
        }
        ui.separator();
    }
}

fn draw_compose(ui: &imgui::Ui, view: &mut ViewModel, actions: &mut Vec<UiAction>) {
    let width = ui.content_region_avail()[0];
    ui.input_text_multiline("##message-textarea", &mut view.compose, [width, 110.0])
        .build();

    let has_text = !view.compose.trim().is_empty();
    ui.disabled(!has_text, || {
        if ui.button("Translate & Send") {
            actions.push(UiAction::Send);
        }
        ui.same_line();
        if ui.button("Translate & Copy") {
            actions.push(UiAction::Copy);
        }
    });
}

fn draw_settings(ui: &imgui::Ui, state: &mut AppState) {
    let cfg = &mut state.config;
    ui.text_disabled("Connection (applies on next start)");
    ui.input_text("Client ID", &mut cfg.client_id).build();
    ui.input_text("Region", &mut cfg.region)
        .hint("mypurecloud.com")
        .build();
    ui.input_text("Redirect URI", &mut cfg.redirect_uri).build();
    ui.input_text("Translate URI", &mut cfg.translate_service_uri)
        .build();
    ui.checkbox("Remember sign-in", &mut cfg.persist_token);

    ui.separator();
    ui.input_text("Agent alias", &mut cfg.agent_alias)
        .hint("fills {{AGENT_ALIAS}}")
        .build();
    state.controller.session.agent_alias = cfg.agent_alias();

    ui.separator();
    let mut theme_idx = THEMES.iter().position(|t| *t == cfg.theme).unwrap_or(0);
    if ui.combo_simple_string("Theme", &mut theme_idx, THEMES) {
        cfg.theme = THEMES[theme_idx].to_string();
        state.theme_changed = true;
    }
    let font_labels: Vec<&str> = state
        .available_fonts
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    let mut font_idx = state
        .available_fonts
        .iter()
        .position(|f| f.name == cfg.font_name)
        .unwrap_or(0);
    if ui.combo_simple_string("Font", &mut font_idx, &font_labels) {
        if let Some(font) = state.available_fonts.get(font_idx) {
            cfg.font_name = font.name.clone();
            state.font_changed = true;
        }
    }
    let mut size = cfg.font_size;
    if ui
        .input_float("Font Size", &mut size)
        .step(1.0)
        .step_fast(4.0)
        .build()
    {
        cfg.font_size = size.clamp(10.0, 32.0);
        state.font_changed = true;
    }

    ui.separator();
    if ui.button("Save") {
        cfg.save();
        state.settings_status = "Saved".into();
        info!("Settings saved");
    }
    if !state.settings_status.is_empty() {
        ui.same_line();
        ui.text_disabled(&state.settings_status);
    }
}

// ─── Logging helpers ─────────────────────────────────────────────────

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

fn rotate_file(path: &std::path::Path) {
    if let Ok(meta) = std::fs::metadata(path) {
        if meta.len() >= MAX_LOG_SIZE {
            let old = path.with_extension("old");
            let _ = std::fs::rename(path, old);
        }
    }
}

fn setup_logging() {
    let log_path = config::config_dir().join("agent-assist.log");
    rotate_file(&log_path);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339_millis(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stderr());

    if let Ok(file) = log_file {
        dispatch = dispatch.chain(file);
    } else {
        eprintln!("Warning: could not open log file {}", log_path.display());
    }

    dispatch.apply().expect("Failed to initialize logger");
}

// ─── Main ────────────────────────────────────────────────────────────

fn main() {
    setup_logging();

    info!("Agent Assist Translator starting");
    let launch = match std::env::args().nth(1) {
        Some(arg) => LaunchParams::parse(&arg),
        None => Err(AssistError::Launch(
            "start with the conversation URL, e.g. \"?conversationid=<id>&language=en-us\"".into(),
        )),
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = App::new(launch);
    event_loop.run_app(&mut app).expect("Event loop error");
}
