//! Frame driver thread.
//!
//! The driver owns a [`Pipeline`] on a dedicated thread and talks to the rest
//! of the application through a [`PipelineBridge`].
//!
//! # Loop
//!
//! Each tick:
//! 1. Drain pending [`PipelineCommand`]s. Edits are applied here, so they never
//!    overlap a frame.
//! 2. Run one frame unless paused, and report it as a [`SinkMessage`].
//! 3. Sleep to hold the configured frame rate. A rate of 0 runs frames back to
//!    back.
//!
//! On exit (a `Shutdown` command, the running flag cleared, or the bridge
//! dropped) the pipeline is shut down and `SinkMessage::Shutdown` is sent.

use crate::config::PipelineSettings;
use crate::pipeline::bridge::{FrameSummary, PipelineBridge, PipelineCommand, SinkMessage};
use crate::pipeline::executor::{Pipeline, PipelineBuilder};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub struct FrameDriver {
    pipeline: Pipeline,
    command_rx: Receiver<PipelineCommand>,
    message_tx: Sender<SinkMessage>,
    running: Arc<AtomicBool>,
    paused: bool,
    frame_rate_hz: u32,
    last_frame_time: Instant,
    /// Messages dropped because the frontend queue was full.
    dropped_messages: u64,
}

impl FrameDriver {
    pub fn new(
        pipeline: Pipeline,
        command_rx: Receiver<PipelineCommand>,
        message_tx: Sender<SinkMessage>,
        running: Arc<AtomicBool>,
        frame_rate_hz: u32,
    ) -> Self {
        Self {
            pipeline,
            command_rx,
            message_tx,
            running,
            paused: false,
            frame_rate_hz,
            last_frame_time: Instant::now(),
            dropped_messages: 0,
        }
    }

    /// Build a pipeline from `builder` and drive it on a new thread.
    ///
    /// Published endpoint values are forwarded over the returned bridge.
    pub fn spawn(
        builder: PipelineBuilder,
        settings: &PipelineSettings,
    ) -> std::io::Result<(PipelineBridge, DriverHandle)> {
        let settings = settings.clone().sanitized();
        let (bridge, command_rx, message_tx) =
            PipelineBridge::new(settings.command_capacity, settings.message_capacity);
        let pipeline = builder
            .settings(&settings)
            .sink(message_tx.clone())
            .build();

        let running = Arc::new(AtomicBool::new(true));
        let mut driver = FrameDriver::new(
            pipeline,
            command_rx,
            message_tx,
            running.clone(),
            settings.frame_rate_hz,
        );

        let thread = std::thread::Builder::new()
            .name("framegraph-driver".into())
            .spawn(move || driver.run())?;

        Ok((bridge, DriverHandle { thread, running }))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frame_rate_hz(&self) -> u32 {
        self.frame_rate_hz
    }

    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages
    }

    /// Run the main loop until stopped.
    pub fn run(&mut self) {
        tracing::info!("Frame driver started at {} Hz", self.frame_rate_hz);

        while self.running.load(Ordering::SeqCst) {
            self.step();
            self.rate_limit();
        }

        self.pipeline.shutdown();
        // The frontend may have stopped draining; never block on exit.
        self.try_send_message(SinkMessage::Shutdown);
        tracing::info!(
            "Frame driver stopped ({} messages dropped)",
            self.dropped_messages
        );
    }

    /// One tick without rate limiting: apply commands, then run a frame.
    pub fn step(&mut self) {
        self.process_commands();
        if self.running.load(Ordering::SeqCst) && !self.paused {
            self.run_frame();
        }
    }

    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: PipelineCommand) {
        let result = match cmd {
            PipelineCommand::ApplyNodeTree(tree) => {
                self.pipeline.import_nodetree(&tree).map(|_| ())
            }
            PipelineCommand::CreateNode { type_name, id } => {
                self.pipeline.create_node(&type_name, id).map(|_| ())
            }
            PipelineCommand::SetSettings { id, settings } => {
                self.pipeline.set_settings(id, settings)
            }
            PipelineCommand::SetStatic { id, slot, value } => {
                self.pipeline.set_static(id, &slot, value)
            }
            PipelineCommand::CreateLinks { id, links } => self.pipeline.create_links(id, &links),
            PipelineCommand::Prune(keep) => {
                self.pipeline.prune_nodetree(keep);
                Ok(())
            }
            PipelineCommand::SetFrameRate(hz) => {
                tracing::debug!("Frame rate set to {} Hz", hz);
                self.frame_rate_hz = hz;
                Ok(())
            }
            PipelineCommand::Pause => {
                self.paused = true;
                Ok(())
            }
            PipelineCommand::Resume => {
                self.paused = false;
                Ok(())
            }
            PipelineCommand::RequestTopology => {
                let snapshot = self.pipeline.graph().snapshot();
                self.try_send_message(SinkMessage::Topology(snapshot));
                Ok(())
            }
            PipelineCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!("Graph edit failed: {}", e);
            self.try_send_message(SinkMessage::EditError(e.to_string()));
        }
    }

    fn run_frame(&mut self) {
        match self.pipeline.run() {
            Ok(report) => {
                for fault in &report.faults {
                    self.try_send_message(SinkMessage::EntryFault {
                        frame: report.frame,
                        node_id: fault.entry,
                        error: fault.error.to_string(),
                    });
                }
                self.try_send_message(SinkMessage::FrameComplete(FrameSummary::from(&report)));
            }
            Err(e) => {
                let frame = self.pipeline.frame();
                self.try_send_message(SinkMessage::FrameAborted {
                    frame,
                    error: e.to_string(),
                });
            }
        }
    }

    fn rate_limit(&mut self) {
        if self.frame_rate_hz == 0 {
            std::thread::yield_now();
            return;
        }

        let target_interval = Duration::from_micros(1_000_000 / self.frame_rate_hz as u64);
        let elapsed = self.last_frame_time.elapsed();

        if elapsed < target_interval {
            std::thread::sleep(target_interval - elapsed);
        }

        self.last_frame_time = Instant::now();
    }

    /// Send without blocking; a full queue drops the message.
    fn try_send_message(&mut self, msg: SinkMessage) {
        if self.message_tx.try_send(msg).is_err() {
            self.dropped_messages += 1;
        }
    }
}

/// Owner-side handle to a spawned driver thread.
pub struct DriverHandle {
    thread: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

impl DriverHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the driver to stop after its current tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Stop the driver and wait for it to exit.
    pub fn join(self) -> std::thread::Result<()> {
        self.stop();
        self.thread.join()
    }
}
