//! The sequential pipeline driver.
//!
//! A pipeline runs its filters in declared order, strictly single-threaded:
//! preflight across all of them (against a scratch copy of the store), then
//! execute across all of them. A failing preflight prevents execution
//! entirely; a failing execute halts the pass at that filter, leaving
//! earlier filters' results in the store as-is, with no rollback.
//!
//! Status flows outward over an optional crossbeam channel; cancellation
//! flows inward through a shared atomic flag. Neither is used for
//! synchronization between filters.

use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, VoxelPipeError};
use crate::filter::context::{FilterContext, Phase, PipelineMessage};
use crate::filter::params::ParameterValue;
use crate::filter::{Filter, FilterState};
use crate::store::DataContainerArray;

/// One pipeline step: the filter plus its driver-side bookkeeping.
pub struct FilterSlot {
    pub filter: Box<dyn Filter>,
    pub state: FilterState,
    /// 0 = ok, negative = failure. The only thing the driver inspects.
    pub error_code: i32,
    /// Human-readable failure description, user-facing only.
    pub error_message: Option<String>,
}

impl FilterSlot {
    fn new(filter: Box<dyn Filter>) -> Self {
        Self {
            filter,
            state: FilterState::Constructed,
            error_code: 0,
            error_message: None,
        }
    }
}

impl std::fmt::Debug for FilterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSlot")
            .field("filter", &self.filter.name())
            .field("state", &self.state)
            .field("error_code", &self.error_code)
            .finish()
    }
}

/// An ordered sequence of filters and the driver that runs them.
#[derive(Default)]
pub struct Pipeline {
    slots: Vec<FilterSlot>,
    status_tx: Option<Sender<PipelineMessage>>,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a status listener channel.
    pub fn with_listener(mut self, tx: Sender<PipelineMessage>) -> Self {
        self.status_tx = Some(tx);
        self
    }

    /// Attach or replace the status listener channel.
    pub fn set_listener(&mut self, tx: Sender<PipelineMessage>) {
        self.status_tx = Some(tx);
    }

    /// The shared cancel flag. A host sets it to request cooperative
    /// cancellation; filters observe it between expensive loop iterations.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Append a filter. Returns its index.
    pub fn push(&mut self, filter: Box<dyn Filter>) -> usize {
        self.slots.push(FilterSlot::new(filter));
        self.slots.len() - 1
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[FilterSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&FilterSlot> {
        self.slots.get(index)
    }

    /// Apply a parameter to the filter at `index`, advancing its state to
    /// `Configured`.
    pub fn set_parameter(
        &mut self,
        index: usize,
        name: &str,
        value: &ParameterValue,
    ) -> Result<()> {
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            VoxelPipeError::parameter(name, format!("no filter at index {}", index))
        })?;
        slot.filter.set_parameter(name, value)?;
        if slot.state == FilterState::Constructed {
            slot.state = FilterState::Configured;
        }
        Ok(())
    }

    /// Run the preflight phase over every filter, in order, against `store`.
    ///
    /// On success every slot is `Validated` and `store` holds the full
    /// output schema of the pipeline, without any numeric work having run.
    /// The first failure halts the pass and is returned.
    pub fn preflight(&mut self, store: &mut DataContainerArray) -> Result<()> {
        self.run_phase(store, Phase::Preflight)?;
        self.notify(PipelineMessage::PreflightPassed {
            filter_count: self.slots.len(),
        });
        Ok(())
    }

    /// Run the execute phase over every filter, in order, against `store`.
    ///
    /// Assumes a passed preflight; each plan body re-validates its own
    /// prerequisites anyway, so a skipped preflight degrades to per-filter
    /// errors rather than undefined behavior. A failure halts the pass at
    /// that filter; earlier results stay in the store.
    pub fn execute(&mut self, store: &mut DataContainerArray) -> Result<()> {
        self.run_phase(store, Phase::Execute)?;
        self.notify(PipelineMessage::PipelineCompleted {
            filter_count: self.slots.len(),
        });
        Ok(())
    }

    /// The canonical driver: preflight everything against a scratch copy of
    /// `store`, and only if the whole pipeline validates, execute against
    /// the real store.
    pub fn run(&mut self, store: &mut DataContainerArray) -> Result<()> {
        let mut scratch = store.duplicate();
        self.preflight(&mut scratch)?;
        self.execute(store)
    }

    fn run_phase(&mut self, store: &mut DataContainerArray, phase: Phase) -> Result<()> {
        for index in 0..self.slots.len() {
            if self.cancel.load(Ordering::Relaxed) {
                self.notify(PipelineMessage::PipelineCanceled { index });
                return Err(VoxelPipeError::Canceled);
            }

            let name = self.slots[index].filter.name().to_string();
            self.notify(PipelineMessage::FilterStarted {
                index,
                name: name.clone(),
                phase,
            });

            let ctx = FilterContext::new(phase, index, name.clone())
                .with_cancel_flag(self.cancel.clone());
            let ctx = match &self.status_tx {
                Some(tx) => ctx.with_listener(tx.clone()),
                None => ctx,
            };

            let slot = &mut self.slots[index];
            match slot.filter.plan(store, &ctx) {
                Ok(()) => {
                    slot.state = match phase {
                        Phase::Preflight => FilterState::Validated,
                        Phase::Execute => FilterState::Executed,
                    };
                    slot.error_code = 0;
                    slot.error_message = None;
                    self.notify(PipelineMessage::FilterCompleted { index, name, phase });
                }
                Err(err) => {
                    let code = err.code();
                    let message = err.to_string();
                    slot.state = FilterState::Failed;
                    slot.error_code = code;
                    slot.error_message = Some(message.clone());
                    tracing::error!(filter = %name, code, "{} failed during {}: {}", name, phase, message);
                    self.notify(PipelineMessage::FilterFailed {
                        index,
                        name,
                        code,
                        message,
                    });
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn notify(&self, message: PipelineMessage) {
        if let Some(tx) = &self.status_tx {
            let _ = tx.send(message);
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("slots", &self.slots)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::params::ParameterDescriptor;
    use crossbeam_channel::unbounded;

    /// Minimal filter that succeeds, or fails in a chosen phase.
    #[derive(Debug)]
    struct ProbeFilter {
        fail_in: Option<Phase>,
    }

    impl ProbeFilter {
        fn new(fail_in: Option<Phase>) -> Self {
            Self { fail_in }
        }
    }

    impl Filter for ProbeFilter {
        fn name(&self) -> &'static str {
            "Probe"
        }

        fn parameters(&self) -> &'static [ParameterDescriptor] {
            &[]
        }

        fn set_parameter(&mut self, name: &str, _value: &ParameterValue) -> Result<()> {
            Err(crate::filter::params::unknown_parameter("Probe", name))
        }

        fn parameter(&self, _name: &str) -> Option<ParameterValue> {
            None
        }

        fn plan(&mut self, _store: &mut DataContainerArray, ctx: &FilterContext) -> Result<()> {
            if self.fail_in == Some(ctx.phase()) {
                return Err(VoxelPipeError::External("forced failure".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_run_preflights_all_then_executes_all() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Box::new(ProbeFilter::new(None)));
        pipeline.push(Box::new(ProbeFilter::new(None)));

        let mut store = DataContainerArray::new();
        pipeline.run(&mut store).unwrap();

        for slot in pipeline.slots() {
            assert_eq!(slot.state, FilterState::Executed);
            assert_eq!(slot.error_code, 0);
        }
    }

    #[test]
    fn test_preflight_failure_blocks_execution() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Box::new(ProbeFilter::new(Some(Phase::Preflight))));
        pipeline.push(Box::new(ProbeFilter::new(None)));

        let mut store = DataContainerArray::new();
        assert!(pipeline.run(&mut store).is_err());

        assert_eq!(pipeline.slot(0).unwrap().state, FilterState::Failed);
        assert!(pipeline.slot(0).unwrap().error_code < 0);
        // The second filter never ran in any phase.
        assert_eq!(pipeline.slot(1).unwrap().state, FilterState::Constructed);
    }

    #[test]
    fn test_execute_failure_halts_midway() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Box::new(ProbeFilter::new(None)));
        pipeline.push(Box::new(ProbeFilter::new(Some(Phase::Execute))));
        pipeline.push(Box::new(ProbeFilter::new(None)));

        let mut store = DataContainerArray::new();
        assert!(pipeline.run(&mut store).is_err());

        assert_eq!(pipeline.slot(0).unwrap().state, FilterState::Executed);
        assert_eq!(pipeline.slot(1).unwrap().state, FilterState::Failed);
        // Halted: the third filter validated but never executed.
        assert_eq!(pipeline.slot(2).unwrap().state, FilterState::Validated);
    }

    #[test]
    fn test_cancel_stops_before_next_filter() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Box::new(ProbeFilter::new(None)));
        pipeline.cancel_flag().store(true, Ordering::Relaxed);

        let mut store = DataContainerArray::new();
        let err = pipeline.preflight(&mut store).unwrap_err();
        assert!(matches!(err, VoxelPipeError::Canceled));
    }

    #[test]
    fn test_status_messages_emitted_in_order() {
        let (tx, rx) = unbounded();
        let mut pipeline = Pipeline::new().with_listener(tx);
        pipeline.push(Box::new(ProbeFilter::new(None)));

        let mut store = DataContainerArray::new();
        pipeline.run(&mut store).unwrap();
        drop(pipeline);

        let messages: Vec<PipelineMessage> = rx.iter().collect();
        assert!(matches!(
            messages[0],
            PipelineMessage::FilterStarted {
                phase: Phase::Preflight,
                ..
            }
        ));
        assert!(messages
            .iter()
            .any(|m| matches!(m, PipelineMessage::PreflightPassed { .. })));
        assert!(matches!(
            messages.last().unwrap(),
            PipelineMessage::PipelineCompleted { .. }
        ));
    }

    #[test]
    fn test_failed_set_parameter_keeps_state() {
        let mut pipeline = Pipeline::new();
        let index = pipeline.push(Box::new(ProbeFilter::new(None)));
        assert_eq!(pipeline.slot(index).unwrap().state, FilterState::Constructed);

        // ProbeFilter declares no parameters, so this fails and the slot
        // stays Constructed.
        let err = pipeline.set_parameter(index, "nope", &ParameterValue::Bool(true));
        assert!(err.is_err());
        assert_eq!(pipeline.slot(index).unwrap().state, FilterState::Constructed);
    }
}
