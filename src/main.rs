use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, stack, text, text_input, Canvas, Column};
use iced::{window, Alignment, Color, Element, Length, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

mod config;
mod crop;
mod error;
mod export;
mod gesture;
mod logging;
mod media;
mod state;
mod ui;

use config::CropperConfig;
use crop::{SlotKind, Viewport, SLOT_COUNT};
use gesture::{GestureInterpreter, GestureSettings, InputEvent};
use media::decode::{self, DecodedImage};
use media::import::{self, UploadedFile};
use state::reorder::ClickOutcome;
use state::{LoadRequest, Session, SessionPhase};

/// Initial window size
const WINDOW_SIZE: Size = Size::new(1280.0, 860.0);
/// Horizontal space around the crop canvas
const CANVAS_MARGIN_X: f32 = 48.0;
/// Vertical space taken by the header, controls and processed strip
const CANVAS_CHROME_Y: f32 = 320.0;

/// Main application state
struct PhotoCropper {
    config: CropperConfig,
    session: Session,
    gestures: GestureInterpreter,
    /// Status message to display to the user
    status: String,
    /// Heavy work in progress; input is blocked by an overlay
    busy: bool,
    archive_name: String,
    /// Path of the last written archive
    exported: Option<PathBuf>,
    /// Shown while the archive name differs from what was typed
    name_notice: Option<&'static str>,
    window_size: Size,
    /// Strip thumbnails of the uploads, by asset id
    thumbnails: HashMap<u64, Handle>,
    /// Previews of committed crops, by asset id
    crops: HashMap<u64, Handle>,
    /// Texture of the active slot's source image
    active_preview: Option<Handle>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    AddFiles,
    ImportFolder,
    FolderScanned(Result<Vec<PathBuf>, String>),
    FilesLoaded(Result<Vec<UploadedFile>, String>),
    RemoveUpload(u64),
    ThumbnailClicked(usize),
    ReorderTick(Instant),
    StartCropping,
    Decoded {
        slot: usize,
        asset_id: u64,
        result: Result<DecodedImage, String>,
    },
    Input(InputEvent),
    /// User asked to crop; shows the overlay first
    Commit,
    /// Rasterize on the next turn so the overlay is painted
    RunCommit,
    Previous,
    ArchiveNameChanged(String),
    Export,
    Exported(Result<PathBuf, String>),
    Restart,
    WindowResized(Size),
}

impl PhotoCropper {
    fn new() -> (Self, Task<Message>) {
        let handle = config::load();
        for warning in &handle.warnings {
            warn!("config: {}", warning);
        }
        match &handle.source {
            Some(path) => info!(path = %path.display(), "configuration loaded"),
            None => info!("no configuration file, using defaults"),
        }

        let config = handle.config;
        let mut session = Session::new(&config);
        session.set_viewport(canvas_viewport(WINDOW_SIZE));

        let app = PhotoCropper {
            gestures: GestureInterpreter::new(GestureSettings::from_config(&config)),
            session,
            config,
            status: format!("Add {} images to get started.", SLOT_COUNT),
            busy: false,
            archive_name: export::archive::default_archive_name(),
            exported: None,
            name_notice: None,
            window_size: WINDOW_SIZE,
            thumbnails: HashMap::new(),
            crops: HashMap::new(),
            active_preview: None,
        };

        (app, Task::none())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // ========== Upload ==========
            Message::AddFiles => {
                let picked = FileDialog::new()
                    .set_title("Select images")
                    .add_filter("Images", &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"])
                    .pick_files();

                match picked {
                    Some(paths) => self.read_uploads(paths),
                    None => Task::none(),
                }
            }

            Message::ImportFolder => {
                let Some(folder) = FileDialog::new().set_title("Select folder with images").pick_folder() else {
                    return Task::none();
                };

                self.busy = true;
                self.status = format!("Scanning {}...", folder.display());
                Task::perform(import::scan_folder(folder), |result| {
                    Message::FolderScanned(result.map_err(|e| e.to_string()))
                })
            }

            Message::FolderScanned(result) => {
                self.busy = false;
                match result {
                    Ok(paths) => self.read_uploads(paths),
                    Err(e) => {
                        warn!("folder import failed: {}", e);
                        self.status = e;
                        Task::none()
                    }
                }
            }

            Message::FilesLoaded(result) => {
                self.busy = false;
                let files = match result {
                    Ok(files) => files,
                    Err(e) => {
                        error!("upload failed: {}", e);
                        self.status = e;
                        return Task::none();
                    }
                };

                let thumbnails: Vec<Option<Handle>> = files
                    .iter()
                    .map(|f| f.thumbnail.as_ref().map(ui::strip::handle_for))
                    .collect();
                let before = self.session.pending().len();

                match self.session.add_uploads(files) {
                    Ok(added) => {
                        for (asset, handle) in self.session.pending()[before..].iter().zip(thumbnails) {
                            if let Some(handle) = handle {
                                self.thumbnails.insert(asset.id, handle);
                            }
                        }
                        self.status = format!("Added {} images. {}", added, ui::upload_label(self.session.total()));
                    }
                    Err(e) => self.status = e.to_string(),
                }
                Task::none()
            }

            Message::RemoveUpload(id) => {
                match self.session.remove_upload(id) {
                    Ok(()) => {
                        self.thumbnails.remove(&id);
                        self.status = ui::upload_label(self.session.total());
                    }
                    Err(e) => self.status = e.to_string(),
                }
                Task::none()
            }

            Message::ThumbnailClicked(position) => {
                self.status = match self.session.click_pending(position, Instant::now()) {
                    ClickOutcome::Ignored => return Task::none(),
                    ClickOutcome::Entered(_) => "Reorder mode: click another image to swap.".to_string(),
                    ClickOutcome::Selected(_) => "Click another image to swap.".to_string(),
                    ClickOutcome::Deselected => "Selection cleared.".to_string(),
                    ClickOutcome::Exited => "Reorder mode off.".to_string(),
                    ClickOutcome::Swap(a, b) => format!("Swapped #{} and #{}.", a + 1, b + 1),
                };
                Task::none()
            }

            Message::ReorderTick(now) => {
                if self.session.tick_reorder(now) {
                    self.status = "Reorder mode timed out.".to_string();
                }
                Task::none()
            }

            Message::StartCropping => match self.session.begin_cropping() {
                Ok(request) => {
                    self.status = "Drag to move, scroll or pinch to zoom, double-click to reset.".to_string();
                    self.load(request)
                }
                Err(e) => {
                    self.status = e.to_string();
                    Task::none()
                }
            },

            // ========== Cropping ==========
            Message::Decoded { slot, asset_id, result } => {
                let current = self.session.active().map(|a| (a.slot, a.asset_id));
                if current != Some((slot, asset_id)) {
                    return Task::none();
                }

                match result {
                    Ok(decoded) => {
                        self.active_preview = Some(ui::strip::handle_for(&decoded.preview));
                        self.session.on_decoded(slot, asset_id, decoded);
                        Task::none()
                    }
                    Err(e) => {
                        self.status = format!("{} Skipped {}.", e, ui::slot_label(slot));
                        let next = self.session.on_decode_failed(slot, asset_id, &e);
                        self.load(next)
                    }
                }
            }

            Message::Input(event) => {
                self.gestures.handle(event, self.session.editor_mut());
                Task::none()
            }

            Message::Commit => {
                if self.busy || self.session.phase() != SessionPhase::Crop {
                    return Task::none();
                }
                self.busy = true;
                self.status = "Cropping...".to_string();
                Task::done(Message::RunCommit)
            }

            Message::RunCommit => {
                self.busy = false;
                match self.session.commit_crop() {
                    Ok(outcome) => {
                        if let Some(cropped) = &outcome.asset.cropped {
                            self.crops
                                .insert(outcome.asset.id, ui::strip::handle_for(&cropped.preview));
                        }
                        self.status = format!("{} saved.", ui::slot_label(outcome.asset.original_index));
                        self.load(outcome.next)
                    }
                    Err(e) => {
                        error!("commit failed: {}", e);
                        self.status = e.to_string();
                        Task::none()
                    }
                }
            }

            Message::Previous => {
                if self.busy {
                    return Task::none();
                }
                match self.session.previous_slot() {
                    Some(request) => {
                        self.crops.remove(&request.asset_id);
                        self.status = format!("Back to {}.", ui::slot_label(request.slot));
                        self.load(Some(request))
                    }
                    None => Task::none(),
                }
            }

            // ========== Export ==========
            Message::ArchiveNameChanged(name) => {
                self.archive_name = name;
                Task::none()
            }

            Message::Export => {
                if self.busy {
                    return Task::none();
                }
                let name = match export::archive::sanitize_name(&self.archive_name) {
                    Ok(name) => name,
                    Err(e) => {
                        self.status = e.to_string();
                        return Task::none();
                    }
                };
                let entries = match self.session.export_entries() {
                    Ok(entries) => entries,
                    Err(e) => {
                        self.status = e.to_string();
                        return Task::none();
                    }
                };

                self.name_notice = name.notice();
                if name.altered {
                    info!(name = %name.name, "archive name sanitized");
                    self.archive_name = name.name.clone();
                }
                self.busy = true;
                self.status = ui::with_notice(format!("Writing {}.zip...", name.name), self.name_notice);

                Task::perform(
                    export::archive::export_archive(self.config.output_dir(), name, entries),
                    |result| Message::Exported(result.map_err(|e| e.to_string())),
                )
            }

            Message::Exported(result) => {
                self.busy = false;
                match result {
                    Ok(path) => {
                        self.status = ui::with_notice(format!("Saved {}", path.display()), self.name_notice);
                        self.exported = Some(path);
                    }
                    Err(e) => {
                        error!("export failed: {}", e);
                        self.status = ui::with_notice(format!("{}. Try again.", e), self.name_notice);
                    }
                }
                Task::none()
            }

            Message::Restart => {
                self.session.restart();
                self.gestures.cancel();
                self.thumbnails.clear();
                self.crops.clear();
                self.active_preview = None;
                self.exported = None;
                self.name_notice = None;
                self.busy = false;
                self.archive_name = export::archive::default_archive_name();
                self.status = format!("Add {} images to get started.", SLOT_COUNT);
                Task::none()
            }

            Message::WindowResized(size) => {
                self.window_size = size;
                self.gestures.cancel();
                self.session.set_viewport(canvas_viewport(size));
                Task::none()
            }
        }
    }

    /// Validate a batch and read it in the background
    fn read_uploads(&mut self, paths: Vec<PathBuf>) -> Task<Message> {
        let checked = import::validate_types(&paths).and_then(|_| self.session.check_capacity(paths.len()));
        if let Err(e) = checked {
            warn!("upload rejected: {}", e);
            self.status = e.to_string();
            return Task::none();
        }

        self.busy = true;
        self.status = format!("Reading {} files...", paths.len());
        Task::perform(
            import::read_files(paths, self.config.thumbnail_size),
            |result| Message::FilesLoaded(result.map_err(|e| e.to_string())),
        )
    }

    /// Start decoding the newly active slot
    fn load(&mut self, request: Option<LoadRequest>) -> Task<Message> {
        self.gestures.cancel();
        self.active_preview = None;

        let Some(request) = request else {
            if self.session.phase() == SessionPhase::Complete {
                self.status = "All images cropped. Name the archive and save it.".to_string();
            }
            return Task::none();
        };

        let LoadRequest { slot, asset_id, name, bytes } = request;
        Task::perform(decode::decode_image(name, bytes), move |result| Message::Decoded {
            slot,
            asset_id,
            result: result.map_err(|e| e.to_string()),
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content = match self.session.phase() {
            SessionPhase::Upload => self.upload_view(),
            SessionPhase::Crop => self.crop_view(),
            SessionPhase::Complete => self.complete_view(),
        };

        let page = container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20);

        if !self.busy {
            return page.into();
        }

        let overlay = container(text("Working...").size(28))
            .center(Length::Fill)
            .style(|_theme: &Theme| container::Style {
                background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.6).into()),
                ..Default::default()
            });
        stack![page, overlay].into()
    }

    fn upload_view(&self) -> Element<Message> {
        let ready = self.session.pending().len() == SLOT_COUNT;
        let has_room = self.session.remaining_uploads() > 0;

        let controls = row![
            button("Add images").on_press_maybe(has_room.then_some(Message::AddFiles)).padding(10),
            button("Add folder").on_press_maybe(has_room.then_some(Message::ImportFolder)).padding(10),
            button("Start cropping")
                .style(button::success)
                .on_press_maybe(ready.then_some(Message::StartCropping))
                .padding(10),
        ]
        .spacing(12);

        let hint = if self.session.reorder().is_active() {
            "Reorder mode: click two images to swap them, double-click to leave."
        } else {
            "Double-click an image to reorder. The first two images become the covers."
        };

        let content: Column<Message> = column![
            text("Photo Cropper").size(36),
            text(ui::upload_label(self.session.pending().len())).size(18),
            controls,
            text(hint).size(14),
            iced::widget::scrollable(ui::strip::pending_grid(
                self.session.pending(),
                &self.thumbnails,
                self.session.reorder().selected(),
            ))
            .height(Length::Fill),
            text(&self.status).size(14),
        ]
        .spacing(16);

        content.into()
    }

    fn crop_view(&self) -> Element<Message> {
        let slot = self.session.cursor();
        let kind = SlotKind::for_slot(slot);

        let header = row![
            text(ui::slot_label(slot)).size(24),
            text(ui::ratio_label(kind)).size(16),
            text(ui::progress_label(slot)).size(16),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let canvas_size = canvas_size(self.window_size);
        let surface: Element<Message> = match (self.session.editor(), &self.active_preview) {
            (Some(editor), Some(preview)) => Canvas::new(ui::canvas::CropCanvas {
                preview,
                editor,
                pinch_center: self.gestures.pinch_center(),
            })
            .width(Length::Fixed(canvas_size.width))
            .height(Length::Fixed(canvas_size.height))
            .into(),
            _ => container(text("Loading image..."))
                .width(Length::Fixed(canvas_size.width))
                .height(Length::Fixed(canvas_size.height))
                .center_x(Length::Fixed(canvas_size.width))
                .center_y(Length::Fixed(canvas_size.height))
                .into(),
        };

        let loaded = self.session.active().is_some_and(|a| a.image.is_some());
        let controls = row![
            button("Previous")
                .on_press_maybe((!self.session.processed().is_empty()).then_some(Message::Previous))
                .padding(10),
            button("Crop & next")
                .style(button::success)
                .on_press_maybe(loaded.then_some(Message::Commit))
                .padding(10),
            text(ui::remaining_label(slot, self.session.pending().iter().map(|a| a.original_index))).size(14),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        column![
            header,
            surface,
            controls,
            text(&self.status).size(14),
            iced::widget::scrollable(ui::strip::processed_grid(self.session.processed(), &self.crops))
                .height(Length::Fill),
        ]
        .spacing(12)
        .into()
    }

    fn complete_view(&self) -> Element<Message> {
        let name_row = row![
            text_input("Archive name", &self.archive_name)
                .on_input(Message::ArchiveNameChanged)
                .on_submit(Message::Export)
                .padding(8)
                .width(Length::Fixed(360.0)),
            text(".zip"),
            button("Save archive")
                .style(button::success)
                .on_press(Message::Export)
                .padding(10),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        let mut content: Column<Message> = column![
            text("All images cropped").size(32),
            text(format!("{} of {} slots done", self.session.processed().len(), SLOT_COUNT)).size(16),
            name_row,
            row![
                button("Previous").on_press(Message::Previous).padding(10),
                button("Start over").style(button::danger).on_press(Message::Restart).padding(10),
            ]
            .spacing(12),
            text(&self.status).size(14),
        ]
        .spacing(16);

        if let Some(path) = &self.exported {
            content = content.push(text(format!("Archive: {}", path.display())).size(14));
        }

        content
            .push(
                iced::widget::scrollable(ui::strip::processed_grid(self.session.processed(), &self.crops))
                    .height(Length::Fill),
            )
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let resize = window::resize_events().map(|(_id, size)| Message::WindowResized(size));

        if self.session.reorder().is_active() {
            Subscription::batch([
                resize,
                iced::time::every(Duration::from_millis(500)).map(Message::ReorderTick),
            ])
        } else {
            resize
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Size of the crop canvas for a given window size
fn canvas_size(window: Size) -> Size {
    Size::new(
        (window.width - CANVAS_MARGIN_X).max(0.0),
        (window.height - CANVAS_CHROME_Y).max(0.0),
    )
}

fn canvas_viewport(window: Size) -> Viewport {
    let size = canvas_size(window);
    Viewport::new(size.width as f64, size.height as f64)
}

fn main() -> iced::Result {
    if let Err(e) = logging::init_logger() {
        eprintln!("logging disabled: {}", e);
    }
    info!("starting photo cropper");

    iced::application("Photo Cropper", PhotoCropper::update, PhotoCropper::view)
        .subscription(PhotoCropper::subscription)
        .theme(PhotoCropper::theme)
        .window_size(WINDOW_SIZE)
        .centered()
        .run_with(PhotoCropper::new)
}
