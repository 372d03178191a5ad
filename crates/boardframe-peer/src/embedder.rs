use boardframe_block::{
    frame_spec_for, parse_block, render_frame_markup, FrameContext, FrameUrlBuilder,
    DEFAULT_HEIGHT,
};
use boardframe_host::{
    DocumentId, FrameHost, FrameKey, FrameSpec, Host, LeafId, MountTarget, Notifier, PanelHost,
    ViewMode, Workspace,
};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::commands::{self, HostCommand, MenuItem, PanelView};
use crate::config::EmbedConfig;
use crate::error::Result;
use crate::insert::{insert_new_block, InsertedBlock};
use crate::instance::{Dispatch, FrameInstance, InstanceOptions};
use crate::live::{BroadcastReport, LiveFrames};
use crate::message::PeerEvent;
use crate::panel::{PanelLaunch, PanelRegistry, ToggleOutcome};

/// Where in the host a block is being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSite {
    pub document: DocumentId,
    /// Render container the block belongs to.
    pub mode: ViewMode,
    /// Line of the block in the document.
    pub position: usize,
}

/// A rendered inline block.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedBlock {
    pub frame: FrameKey,
    pub url: Url,
    pub markup: String,
    /// Why `data` was kept as raw text, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_error: Option<String>,
}

/// Result of [`Embedder::run_command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandOutcome {
    Inserted(InsertedBlock),
    Panel(ToggleOutcome),
}

/// What [`Embedder::unload`] released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnloadReport {
    pub panel_leaves: usize,
    pub inline_frames: usize,
}

/// The embedding core for one host.
///
/// Owns the side panel and every inline frame. Hosts forward their events
/// here: block renders, peer messages, layout changes, closed documents and
/// user commands.
pub struct Embedder {
    config: EmbedConfig,
    urls: FrameUrlBuilder,
    panel: PanelRegistry,
    live: LiveFrames,
}

impl Embedder {
    pub fn new(config: EmbedConfig) -> Result<Self> {
        config.validate()?;
        let urls = FrameUrlBuilder::new(&config.endpoint)?.with_id_length(config.id_length)?;
        let panel = PanelRegistry::new(config.view_type.clone())
            .with_close_on_second_toggle(config.close_on_second_toggle);

        Ok(Self {
            config,
            urls,
            panel,
            live: LiveFrames::new(),
        })
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn urls(&self) -> &FrameUrlBuilder {
        &self.urls
    }

    pub fn panel(&self) -> &PanelRegistry {
        &self.panel
    }

    pub fn live(&self) -> &LiveFrames {
        &self.live
    }

    /// Registration data of the side-panel view.
    pub fn panel_view(&self) -> PanelView {
        PanelView {
            view_type: self.config.view_type.clone(),
            display_text: self.config.display_text.clone(),
            icon: self.config.icon.clone(),
        }
    }

    /// The ribbon entry, sharing the panel's icon and display text.
    pub fn ribbon_item(&self) -> MenuItem {
        commands::ribbon_item(&self.config.icon, &self.config.display_text)
    }

    /// Host context for URLs, read fresh on every call.
    pub fn context<H: Workspace + ?Sized>(&self, host: &H) -> FrameContext {
        FrameContext {
            locale: host.locale(),
            user_agent: host.user_agent(),
            mode: host.active_view().map(|view| view.mode),
        }
    }

    fn options(&self, context: &FrameContext) -> InstanceOptions {
        InstanceOptions {
            host_version: self.urls.host_version(&context.user_agent),
            target_origin: self.config.target_origin.clone(),
            origin_policy: self.config.origin_policy.clone(),
        }
    }

    /// Parse a block, mount its frame and start tracking it.
    ///
    /// A malformed `data` value does not fail the render; it is reported in
    /// [`RenderedBlock::data_error`].
    pub fn render_block<H>(
        &mut self,
        host: &mut H,
        source: &str,
        site: &RenderSite,
    ) -> Result<RenderedBlock>
    where
        H: Workspace + FrameHost + ?Sized,
    {
        let parsed = parse_block(source);
        let context = self.context(&*host);
        let url = self.urls.build(&parsed.params, &context);
        let spec = frame_spec_for(&parsed.params, url.clone(), &self.config.appearance);
        let markup = render_frame_markup(&spec);

        let target = MountTarget::Inline {
            document: site.document.clone(),
            mode: site.mode,
            position: site.position,
        };
        let mut frame = FrameInstance::new(target, spec, self.options(&context));
        let key = frame.mount(host)?;
        if let Err(frame) = self.live.register(frame) {
            debug!(key = ?frame.key(), "inline registry refused frame");
        }
        debug!(%key, document = %site.document, mode = %site.mode, "rendered block");

        Ok(RenderedBlock {
            frame: key,
            url,
            markup,
            data_error: parsed.data_error.map(|err| err.to_string()),
        })
    }

    /// Route an inbound message to the frame it came from.
    pub fn on_peer_message(&mut self, event: &PeerEvent) -> Dispatch {
        if let Some(dispatch) = self.panel.dispatch(event) {
            return dispatch;
        }
        match self.live.dispatch(event) {
            Some(dispatch) => dispatch,
            None => {
                debug!(source = %event.source, "message from unknown frame");
                Dispatch::Ignored
            }
        }
    }

    /// Broadcast a reload to the active view's frames.
    pub fn on_layout_change<H: Workspace + ?Sized>(&mut self, host: &H) -> BroadcastReport {
        match host.active_view() {
            Some(active) => self.live.broadcast_reload(&active),
            None => BroadcastReport::default(),
        }
    }

    /// The host removed a rendered block, e.g. because it moved to another
    /// line. Destroys its frame.
    pub fn on_block_removed(&mut self, frame: FrameKey) -> bool {
        self.live.release(frame)
    }

    /// The host is about to re-render every block of one view. Destroys the
    /// frames rendered there so far.
    pub fn on_view_rerender(&mut self, document: &DocumentId, mode: ViewMode) -> usize {
        self.live.release_view(document, mode)
    }

    /// Destroy the frames of a closed document.
    pub fn on_document_closed(&mut self, document: &DocumentId) -> usize {
        self.live.release_document(document)
    }

    /// The host closed a panel leaf on its own.
    pub fn on_panel_closed(&mut self, leaf: LeafId) -> bool {
        self.panel.on_panel_closed(leaf)
    }

    pub fn toggle_panel<H>(&mut self, host: &mut H) -> Result<ToggleOutcome>
    where
        H: Workspace + FrameHost + PanelHost + ?Sized,
    {
        let launch = self.panel_launch(&*host);
        self.panel.toggle(host, launch)
    }

    pub fn open_panel<H>(&mut self, host: &mut H) -> Result<ToggleOutcome>
    where
        H: Workspace + FrameHost + PanelHost + ?Sized,
    {
        let launch = self.panel_launch(&*host);
        self.panel.open(host, launch)
    }

    pub fn close_panel<H: PanelHost + ?Sized>(&mut self, host: &mut H) -> bool {
        self.panel.close(host)
    }

    pub fn insert_block<H>(&mut self, host: &mut H) -> Result<InsertedBlock>
    where
        H: Workspace + Notifier + ?Sized,
    {
        insert_new_block(host, &self.config.block_language, self.config.id_length)
    }

    pub fn run_command<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        command: HostCommand,
    ) -> Result<CommandOutcome> {
        debug!(%command, "running command");
        match command {
            HostCommand::InsertBlock => self.insert_block(host).map(CommandOutcome::Inserted),
            HostCommand::TogglePanel => self.toggle_panel(host).map(CommandOutcome::Panel),
        }
    }

    /// Tear down the panel and destroy every inline frame.
    pub fn unload<H: PanelHost + ?Sized>(&mut self, host: &mut H) -> UnloadReport {
        let report = UnloadReport {
            panel_leaves: self.panel.teardown(host),
            inline_frames: self.live.release_all(),
        };
        info!(
            panel_leaves = report.panel_leaves,
            inline_frames = report.inline_frames,
            "unloaded"
        );
        report
    }

    fn panel_launch<H: Workspace + ?Sized>(&self, host: &H) -> PanelLaunch {
        let context = self.context(&*host);
        PanelLaunch {
            spec: FrameSpec {
                url: self.urls.build_panel(&context),
                title: self.config.display_text.clone(),
                height: DEFAULT_HEIGHT,
                class_marker: self.config.appearance.class_marker.clone(),
                allow: self.config.appearance.allow.clone(),
                data_id: None,
            },
            options: self.options(&context),
        }
    }
}
