use crate::{
    AudioFormat, LOW_DISK_SPACE_THRESHOLD, RecordingController, RecordingNotification,
    RecordingServiceError, RecordingState,
    tests::support::{MockCaptureDevice, orphaned_recording},
};

use tempfile::TempDir;

fn controller(dir: &TempDir) -> RecordingController<MockCaptureDevice> {
    RecordingController::new(MockCaptureDevice::new(dir.path()))
}

/// WHAT: A fresh controller is idle with nothing to report
/// WHY: Derived views must be safe to read before any operation
#[test]
fn given_new_controller_when_reading_views_then_idle_and_zeroed() {
    // Given: A controller that has never been used
    let dir = TempDir::new().unwrap();
    let controller = controller(&dir);

    // When/Then: Every view reports the idle baseline
    assert_eq!(controller.state(), &RecordingState::Idle);
    assert!(!controller.is_recording());
    assert!(!controller.is_paused());
    assert!(controller.metadata().is_none());
    assert_eq!(controller.current_duration(), 0.0);
    assert_eq!(controller.formatted_current_duration(), "00:00");
    assert!(controller.error_message().is_none());
    assert!(!controller.is_disk_space_low());
}

/// WHAT: Starting from idle opens a session with a temp file
/// WHY: The metadata is the only record of where the capture lives
#[tokio::test]
async fn given_idle_controller_when_starting_then_recording_with_metadata() {
    // Given: An idle controller
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);

    // When: Starting a WAV capture
    controller.start(AudioFormat::Wav).await.unwrap();

    // Then: State is recording and metadata points at the device's file
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert!(controller.is_recording());
    let metadata = controller.metadata().unwrap();
    assert_eq!(metadata.format, AudioFormat::Wav);
    assert!(!metadata.is_complete);
    assert!(metadata.temp_file().unwrap().exists());
}

/// WHAT: Full lifecycle ends idle with metadata cleared
/// WHY: A finished session must not leak into the next one
#[tokio::test]
async fn given_recording_when_pause_resume_stop_then_idle_and_metadata_cleared() {
    // Given: A controller that is recording
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.device_mut().recorded_secs = 12.5;
    controller.start(AudioFormat::Wav).await.unwrap();

    // When: Pausing, resuming, then stopping
    controller.pause().unwrap();
    assert_eq!(controller.state(), &RecordingState::Paused);
    assert!(controller.is_recording());
    assert!(controller.is_paused());

    controller.resume().unwrap();
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert!(!controller.is_paused());

    let completed = controller.stop().await.unwrap();

    // Then: Idle, nothing held, and the returned metadata is complete
    assert_eq!(controller.state(), &RecordingState::Idle);
    assert!(!controller.is_recording());
    assert!(controller.metadata().is_none());
    assert!(completed.is_complete);
    assert_eq!(completed.duration, 12.5);
}

/// WHAT: Stopping while paused is allowed
/// WHY: Users stop paused sessions all the time
#[tokio::test]
async fn given_paused_when_stopping_then_idle() {
    // Given: A paused session
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.start(AudioFormat::Wav).await.unwrap();
    controller.pause().unwrap();

    // When: Stopping
    let result = controller.stop().await;

    // Then: Succeeds and returns to idle
    assert!(result.is_ok());
    assert_eq!(controller.state(), &RecordingState::Idle);
}

/// WHAT: Pause while idle is rejected without a state change
/// WHY: Precondition failures only touch the error slot
#[test]
fn given_idle_when_pausing_then_not_recording_and_state_unchanged() {
    // Given: An idle controller
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);

    // When: Pausing
    let result = controller.pause();

    // Then: NotRecording, still idle, error message set
    assert!(matches!(result, Err(RecordingServiceError::NotRecording { .. })));
    assert_eq!(controller.state(), &RecordingState::Idle);
    assert!(!controller.error_message().unwrap().is_empty());
}

/// WHAT: Resume while not paused is rejected without a state change
/// WHY: Resume is only meaningful from the paused state
#[tokio::test]
async fn given_recording_when_resuming_then_not_paused_and_state_unchanged() {
    // Given: An actively recording controller
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.start(AudioFormat::Wav).await.unwrap();

    // When: Resuming without a pause
    let result = controller.resume();

    // Then: NotPaused, still recording, error message set
    assert!(matches!(result, Err(RecordingServiceError::NotPaused { .. })));
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert!(!controller.error_message().unwrap().is_empty());
}

/// WHAT: Resume while idle is rejected without a state change
/// WHY: Covers the "paused is absent" branch from a non-session state
#[test]
fn given_idle_when_resuming_then_state_unchanged_and_error_set() {
    // Given: An idle controller
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);

    // When: Resuming
    let result = controller.resume();

    // Then: Rejected, still idle
    assert!(result.is_err());
    assert_eq!(controller.state(), &RecordingState::Idle);
    assert!(controller.error_message().is_some());
}

/// WHAT: A device pause failure leaves the session recording
/// WHY: Pause/resume failures are local, not device-level faults
#[tokio::test]
async fn given_device_refuses_pause_when_pausing_then_still_recording() {
    // Given: A recording session whose device refuses to pause
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.start(AudioFormat::Wav).await.unwrap();
    controller.device_mut().fail_pause = true;

    // When: Pausing
    let result = controller.pause();

    // Then: Error surfaced, state still recording
    assert!(matches!(result, Err(RecordingServiceError::AudioEngineError { .. })));
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert!(controller.error_message().unwrap().contains("pause refused"));
}

/// WHAT: Starting twice is rejected
/// WHY: Only one capture session can be open
#[tokio::test]
async fn given_recording_when_starting_again_then_already_recording() {
    // Given: A recording session
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.start(AudioFormat::Wav).await.unwrap();
    let original_id = controller.metadata().unwrap().id;

    // When: Starting again
    let result = controller.start(AudioFormat::Wav).await;

    // Then: Rejected and the original session is untouched
    assert!(matches!(result, Err(RecordingServiceError::AlreadyRecording { .. })));
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert_eq!(controller.metadata().unwrap().id, original_id);
    assert_eq!(controller.device().start_calls, 1);
}

/// WHAT: A device start failure moves to the error state verbatim
/// WHY: The device's reason is what the user needs to see
#[tokio::test]
async fn given_device_start_failure_when_starting_then_error_state_with_reason() {
    // Given: A device that cannot start
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.device_mut().fail_start = true;

    // When: Starting
    let result = controller.start(AudioFormat::Wav).await;

    // Then: Error state carries the device's message
    let err = result.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("input device unavailable"));
    assert_eq!(controller.state(), &RecordingState::Error(message.clone()));
    assert_eq!(controller.error_message(), Some(message.as_str()));
    assert!(controller.metadata().is_none());
}

/// WHAT: Starting is refused before the device when disk is short
/// WHY: No file should be created when the capture cannot finish
#[tokio::test]
async fn given_insufficient_disk_when_starting_then_refused_without_device_call() {
    // Given: Less free space than required
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.device_mut().disk_space = LOW_DISK_SPACE_THRESHOLD - 1;

    // When: Starting
    let result = controller.start(AudioFormat::Wav).await;

    // Then: InsufficientDiskSpace with both sizes, device untouched
    match result {
        Err(RecordingServiceError::InsufficientDiskSpace {
            available, required, ..
        }) => {
            assert_eq!(available, LOW_DISK_SPACE_THRESHOLD - 1);
            assert_eq!(required, LOW_DISK_SPACE_THRESHOLD);
        }
        other => panic!("expected InsufficientDiskSpace, got {other:?}"),
    }
    assert_eq!(controller.device().start_calls, 0);
    assert!(matches!(controller.state(), RecordingState::Error(_)));
}

/// WHAT: The required threshold is configurable
/// WHY: Deployments with small disks may lower it
#[tokio::test]
async fn given_lowered_requirement_when_starting_with_little_space_then_recording() {
    // Given: 1 KiB required, 4 KiB free
    let dir = TempDir::new().unwrap();
    let mut device = MockCaptureDevice::new(dir.path());
    device.disk_space = 4096;
    let mut controller = RecordingController::new(device).with_required_disk_space(1024);

    // When: Starting
    controller.start(AudioFormat::Wav).await.unwrap();

    // Then: Recording, but the disk is still reported low
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert!(controller.is_disk_space_low());
}

/// WHAT: The error state is not terminal
/// WHY: A user must be able to retry after a failure
#[tokio::test]
async fn given_error_state_when_starting_again_then_recording_and_slot_cleared() {
    // Given: A controller in the error state
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.device_mut().fail_start = true;
    let _ = controller.start(AudioFormat::Wav).await;
    controller.device_mut().fail_start = false;

    // When: Starting again
    controller.start(AudioFormat::Wav).await.unwrap();

    // Then: Recording with a clean error slot
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert!(controller.error_message().is_none());
}

/// WHAT: A failed stop still clears the session
/// WHY: The half-written file is repaired by crash recovery, not retried
#[tokio::test]
async fn given_device_stop_failure_when_stopping_then_error_and_metadata_cleared() {
    // Given: A recording session whose device fails to stop
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.start(AudioFormat::Wav).await.unwrap();
    controller.device_mut().fail_stop = true;

    // When: Stopping
    let result = controller.stop().await;

    // Then: Error state, no metadata
    assert!(result.is_err());
    assert!(matches!(controller.state(), RecordingState::Error(_)));
    assert!(controller.metadata().is_none());
    assert!(!controller.is_recording());
}

/// WHAT: Stop without a session is a precondition failure
/// WHY: Only device faults move the controller to the error state
#[tokio::test]
async fn given_idle_when_stopping_then_not_recording_and_state_unchanged() {
    // Given: An idle controller
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);

    // When: Stopping
    let result = controller.stop().await;

    // Then: NotRecording, still idle
    assert!(matches!(result, Err(RecordingServiceError::NotRecording { .. })));
    assert_eq!(controller.state(), &RecordingState::Idle);
}

/// WHAT: A checkpoint advances duration and auto-save time
/// WHY: The duration display follows checkpoints
#[tokio::test]
async fn given_recording_when_force_saving_then_duration_advances() {
    // Given: A session that has captured 65.9 seconds
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.start(AudioFormat::Wav).await.unwrap();
    controller.device_mut().recorded_secs = 65.9;

    // When: Checkpointing
    controller.force_save().await;

    // Then: Duration and display reflect the checkpoint
    assert_eq!(controller.current_duration(), 65.9);
    assert_eq!(controller.formatted_current_duration(), "01:05");
    assert!(controller.metadata().unwrap().last_auto_save_time.is_some());
}

/// WHAT: A failed checkpoint is swallowed completely
/// WHY: Checkpointing must never interrupt an active recording
#[tokio::test]
async fn given_failing_checkpoint_when_force_saving_then_state_and_slot_untouched() {
    // Given: A recording session with an earlier precondition error
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.start(AudioFormat::Wav).await.unwrap();
    let _ = controller.resume();
    let prior = controller.error_message().map(str::to_string);
    controller.device_mut().fail_force_save = true;

    // When: The checkpoint fails
    controller.force_save().await;

    // Then: Nothing observable changes
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert_eq!(controller.error_message().map(str::to_string), prior);
    assert!(controller.metadata().unwrap().last_auto_save_time.is_none());
}

/// WHAT: Exactly 100 MiB is not low; one byte less is
/// WHY: The threshold comparison is strict
#[test]
fn given_threshold_boundaries_when_refreshing_disk_space_then_strictly_less_is_low() {
    // Given: A device reporting exactly the threshold
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.device_mut().disk_space = LOW_DISK_SPACE_THRESHOLD;

    // When/Then: At the threshold, not low
    controller.refresh_disk_space();
    assert!(!controller.is_disk_space_low());

    // When/Then: One byte under, low
    controller.device_mut().disk_space = LOW_DISK_SPACE_THRESHOLD - 1;
    controller.refresh_disk_space();
    assert!(controller.is_disk_space_low());
    assert_eq!(
        controller.available_disk_space(),
        Some(LOW_DISK_SPACE_THRESHOLD - 1)
    );
}

/// WHAT: Crossing below the threshold broadcasts once
/// WHY: Subscribers want the transition, not every poll
#[test]
fn given_subscriber_when_disk_crosses_threshold_then_single_notification() {
    // Given: A subscriber and a device with ample space
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    let mut rx = controller.subscribe();
    controller.refresh_disk_space();

    // When: Space drops and is polled twice
    controller.device_mut().disk_space = 1024;
    controller.refresh_disk_space();
    controller.refresh_disk_space();

    // Then: One notification carrying the fixed name token
    let notification = rx.try_recv().unwrap();
    assert_eq!(notification, RecordingNotification::DiskSpaceLow { available: 1024 });
    assert_eq!(notification.name(), "recordingDiskSpaceLow");
    assert!(rx.try_recv().is_err());
}

/// WHAT: Complete entries are filtered from recovery candidates
/// WHY: Only orphaned captures need user attention
#[test]
fn given_mixed_candidates_when_checking_incomplete_then_only_incomplete_returned() {
    // Given: One orphaned and one complete capture
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    let orphan = orphaned_recording(dir.path(), 4.0);
    let done = orphaned_recording(dir.path(), 8.0).completed(dir.path().join("done.wav"), 8.0);
    controller.device_mut().incomplete = vec![orphan.clone(), done];

    // When: Checking
    let candidates = controller.check_for_incomplete_recordings();

    // Then: Only the orphan is offered
    assert_eq!(candidates, vec![orphan]);
}

/// WHAT: Recovery without a temp file fails
/// WHY: There is nothing on disk to finalize
#[tokio::test]
async fn given_metadata_without_file_when_recovering_then_recovery_failed() {
    // Given: Metadata that never got a file
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    let metadata = crate::RecordingMetadata::new(AudioFormat::Wav);

    // When: Recovering
    let result = controller.recover_recording(&metadata).await;

    // Then: RecoveryFailed
    assert!(matches!(result, Err(RecordingServiceError::RecoveryFailed { .. })));
}

/// WHAT: Recovery of a vanished file fails
/// WHY: The temp file may have been cleaned up by the OS
#[tokio::test]
async fn given_missing_file_when_recovering_then_recovery_failed() {
    // Given: Metadata pointing at a file that does not exist
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    let metadata = crate::RecordingMetadata::new(AudioFormat::Wav)
        .with_temp_file(dir.path().join("gone.wav"));

    // When: Recovering
    let result = controller.recover_recording(&metadata).await;

    // Then: RecoveryFailed
    assert!(matches!(result, Err(RecordingServiceError::RecoveryFailed { .. })));
}

/// WHAT: Device recovery errors are reported as RecoveryFailed
/// WHY: Callers handle one recovery error kind
#[tokio::test]
async fn given_device_recover_failure_when_recovering_then_wrapped_as_recovery_failed() {
    // Given: An orphan and a device that cannot finalize it
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.device_mut().fail_recover = true;
    let orphan = orphaned_recording(dir.path(), 3.0);

    // When: Recovering
    let result = controller.recover_recording(&orphan).await;

    // Then: Wrapped, and the original reason survives
    let err = result.unwrap_err();
    assert!(matches!(err, RecordingServiceError::RecoveryFailed { .. }));
    assert!(err.to_string().contains("header rewrite failed"));
}

/// WHAT: Recovery never touches the live session
/// WHY: Orphans are independent of the current capture
#[tokio::test]
async fn given_active_session_when_recovering_orphan_then_session_untouched() {
    // Given: A live recording and an orphan from a previous run
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.start(AudioFormat::Wav).await.unwrap();
    let live_id = controller.metadata().unwrap().id;
    let orphan = orphaned_recording(dir.path(), 7.0);

    // When: Recovering the orphan
    let output = controller.recover_recording(&orphan).await.unwrap();

    // Then: Output points at the orphan and the session is unchanged
    assert_eq!(output.file, orphan.temp_file().unwrap());
    assert_eq!(controller.state(), &RecordingState::Recording);
    assert_eq!(controller.metadata().unwrap().id, live_id);
    assert!(controller.error_message().is_none());
}

/// WHAT: Discarding a never-created file succeeds
/// WHY: Discard is idempotent
#[test]
fn given_nonexistent_file_when_discarding_then_ok() {
    // Given: Metadata pointing nowhere
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    let metadata = crate::RecordingMetadata::new(AudioFormat::Wav)
        .with_temp_file(dir.path().join("never.wav"));

    // When: Discarding
    let result = controller.discard_recording(&metadata);

    // Then: Succeeds
    assert!(result.is_ok());
    assert_eq!(controller.device().discarded, vec![metadata.id]);
}

/// WHAT: Discarding removes the orphaned file
/// WHY: Discarded captures must not be offered again
#[test]
fn given_orphan_when_discarding_then_file_removed() {
    // Given: An orphaned capture on disk
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    let orphan = orphaned_recording(dir.path(), 2.0);
    let file = orphan.temp_file().unwrap().to_path_buf();

    // When: Discarding
    controller.discard_recording(&orphan).unwrap();

    // Then: The file is gone
    assert!(!file.exists());
}

/// WHAT: Discard failures surface to the caller
/// WHY: The user must know the file is still there
#[test]
fn given_device_discard_failure_when_discarding_then_error() {
    // Given: A device that cannot delete
    let dir = TempDir::new().unwrap();
    let mut controller = controller(&dir);
    controller.device_mut().fail_discard = true;
    let orphan = orphaned_recording(dir.path(), 2.0);

    // When: Discarding
    let result = controller.discard_recording(&orphan);

    // Then: Error returned, state unchanged
    assert!(result.is_err());
    assert_eq!(controller.state(), &RecordingState::Idle);
}
