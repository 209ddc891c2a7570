use futures::executor::block_on;
use shared::{
    AnalysisRequest, ClassificationResponse, Classifier, PreviewFactory, RemoteError,
    RequestPhase, SegmentationMode, SegmentationOutcome, SegmentationResponse, SelectedImage,
    Segmenter, UploadOrchestrator,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, PartialEq)]
enum Shown {
    Preview(String),
    Segmentation(Vec<u8>),
}

struct Handle {
    shown: Shown,
    live: Rc<Cell<usize>>,
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

#[derive(Default)]
struct Previews {
    live: Rc<Cell<usize>>,
}

impl PreviewFactory for Previews {
    type Handle = Handle;

    fn preview(&self, image: &SelectedImage) -> Handle {
        self.live.set(self.live.get() + 1);
        Handle {
            shown: Shown::Preview(image.name().to_string()),
            live: Rc::clone(&self.live),
        }
    }

    fn segmentation(&self, bytes: Vec<u8>, _mime_type: &str) -> Handle {
        self.live.set(self.live.get() + 1);
        Handle {
            shown: Shown::Segmentation(bytes),
            live: Rc::clone(&self.live),
        }
    }
}

struct FakeClassifier {
    status: u16,
    body: &'static str,
    calls: Cell<usize>,
}

impl FakeClassifier {
    fn answering(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            calls: Cell::new(0),
        }
    }
}

impl Classifier for FakeClassifier {
    async fn classify(
        &self,
        _image: &SelectedImage,
    ) -> Result<ClassificationResponse, RemoteError> {
        self.calls.set(self.calls.get() + 1);
        ClassificationResponse::from_http(self.status, self.body)
    }
}

enum Answer {
    Http(u16, Option<&'static str>, Vec<u8>),
    TimedOut,
}

#[derive(Default)]
struct FakeSegmenter {
    answers: RefCell<VecDeque<Answer>>,
    hints: RefCell<Vec<Option<String>>>,
}

impl FakeSegmenter {
    fn answering(answers: Vec<Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into()),
            hints: RefCell::default(),
        }
    }

    fn calls(&self) -> usize {
        self.hints.borrow().len()
    }
}

impl Segmenter for FakeSegmenter {
    async fn segment(
        &self,
        _image: &SelectedImage,
        tumor_type: Option<&str>,
    ) -> Result<SegmentationResponse, RemoteError> {
        self.hints.borrow_mut().push(tumor_type.map(str::to_string));
        match self.answers.borrow_mut().pop_front() {
            Some(Answer::Http(status, content_type, body)) => {
                SegmentationResponse::from_http(status, content_type, body)
            }
            Some(Answer::TimedOut) => Err(RemoteError::Timeout(Duration::from_secs(900))),
            None => panic!("segmenter called more often than scripted"),
        }
    }
}

fn run<F, C, S>(
    orchestrator: &mut UploadOrchestrator<F>,
    requests: Vec<AnalysisRequest>,
    classifier: &C,
    segmenter: &S,
) where
    F: PreviewFactory,
    C: Classifier,
    S: Segmenter,
{
    let mut queue: VecDeque<AnalysisRequest> = requests.into();
    while let Some(request) = queue.pop_front() {
        let settlement = block_on(request.execute(classifier, segmenter));
        if let Some(next) = orchestrator.apply(settlement) {
            queue.push_back(next);
        }
    }
}

fn scan() -> SelectedImage {
    SelectedImage::new("scan.png", "image/png", vec![0u8; 120 * 1024])
}

#[test]
fn glioma_is_segmented_with_hint() {
    let previews = Previews::default();
    let live = Rc::clone(&previews.live);
    let mut orchestrator = UploadOrchestrator::new(previews, SegmentationMode::Gated);
    let classifier =
        FakeClassifier::answering(200, r#"{"predicted_result":"glioma","confidence":"87.5"}"#);
    let segmenter =
        FakeSegmenter::answering(vec![Answer::Http(200, Some("image/png"), vec![9, 9, 9])]);

    orchestrator.select_image(scan());
    let requests = orchestrator.submit().unwrap();
    run(&mut orchestrator, requests, &classifier, &segmenter);

    let classification = orchestrator.classification().unwrap();
    assert_eq!(classification.predicted_label, "glioma");
    assert_eq!(classification.confidence, 87.5);
    assert_eq!(*segmenter.hints.borrow(), vec![Some("glioma".to_string())]);
    assert_eq!(
        orchestrator.segmentation().handle().unwrap().shown,
        Shown::Segmentation(vec![9, 9, 9])
    );
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
    assert_eq!(live.get(), 2);

    orchestrator.clear();
    assert_eq!(live.get(), 0);
}

#[test]
fn no_tumor_skips_segmentation_call() {
    let mut orchestrator = UploadOrchestrator::new(Previews::default(), SegmentationMode::Gated);
    let classifier =
        FakeClassifier::answering(200, r#"{"predicted_result":"no tumor","confidence":"99.1"}"#);
    let segmenter = FakeSegmenter::default();

    orchestrator.select_image(scan());
    let requests = orchestrator.submit().unwrap();
    run(&mut orchestrator, requests, &classifier, &segmenter);

    assert_eq!(segmenter.calls(), 0);
    assert_eq!(
        orchestrator.segmentation().handle().unwrap().shown,
        Shown::Preview("scan.png".into())
    );
    assert_eq!(orchestrator.classification().unwrap().confidence, 99.1);
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
}

#[test]
fn error_payload_fails_inline_and_retry_only_segments() {
    let mut orchestrator = UploadOrchestrator::new(Previews::default(), SegmentationMode::Gated);
    let classifier =
        FakeClassifier::answering(200, r#"{"predicted_result":"meningioma","confidence":91}"#);
    let segmenter = FakeSegmenter::answering(vec![
        Answer::Http(
            200,
            Some("application/json"),
            br#"{"error":"model unavailable"}"#.to_vec(),
        ),
        Answer::Http(200, Some("image/jpeg"), vec![4, 2]),
    ]);

    orchestrator.select_image(scan());
    let requests = orchestrator.submit().unwrap();
    run(&mut orchestrator, requests, &classifier, &segmenter);

    assert!(matches!(
        orchestrator.segmentation(),
        SegmentationOutcome::Failed(message) if message == "model unavailable"
    ));
    assert!(orchestrator.classification().is_some());
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
    assert_eq!(orchestrator.take_notification(), None);

    let retry = orchestrator.retry_segmentation().unwrap();
    run(&mut orchestrator, vec![retry], &classifier, &segmenter);

    assert_eq!(classifier.calls.get(), 1);
    assert_eq!(
        *segmenter.hints.borrow(),
        vec![Some("meningioma".to_string()), Some("meningioma".to_string())]
    );
    assert_eq!(
        orchestrator.segmentation().handle().unwrap().shown,
        Shown::Segmentation(vec![4, 2])
    );
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
}

#[test]
fn timeout_keeps_classification() {
    let mut orchestrator = UploadOrchestrator::new(Previews::default(), SegmentationMode::Gated);
    let classifier =
        FakeClassifier::answering(200, r#"{"predicted_result":"glioma","confidence":"60"}"#);
    let segmenter = FakeSegmenter::answering(vec![Answer::TimedOut]);

    orchestrator.select_image(scan());
    let requests = orchestrator.submit().unwrap();
    run(&mut orchestrator, requests, &classifier, &segmenter);

    assert_eq!(orchestrator.classification().unwrap().predicted_label, "glioma");
    assert!(matches!(
        orchestrator.segmentation(),
        SegmentationOutcome::Failed(message) if message == "Request timed out after 900 seconds"
    ));
    assert!(orchestrator.can_retry_segmentation());
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
}

#[test]
fn gated_classification_failure_aborts_cycle() {
    let mut orchestrator = UploadOrchestrator::new(Previews::default(), SegmentationMode::Gated);
    let classifier = FakeClassifier::answering(500, r#"{"message":"model crashed"}"#);
    let segmenter = FakeSegmenter::default();

    orchestrator.select_image(scan());
    let requests = orchestrator.submit().unwrap();
    run(&mut orchestrator, requests, &classifier, &segmenter);

    assert_eq!(segmenter.calls(), 0);
    assert!(orchestrator.classification().is_none());
    assert!(matches!(orchestrator.segmentation(), SegmentationOutcome::NotStarted));
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
    assert_eq!(
        orchestrator.take_notification().as_deref(),
        Some("Error uploading file: Server error: 500 - model crashed")
    );
    assert!(orchestrator.can_submit());
}

#[test]
fn parallel_mode_runs_both_legs_independently() {
    let mut orchestrator =
        UploadOrchestrator::new(Previews::default(), SegmentationMode::Parallel);
    let classifier = FakeClassifier::answering(503, "");
    let segmenter =
        FakeSegmenter::answering(vec![Answer::Http(200, Some("image/png"), vec![5])]);

    orchestrator.select_image(scan());
    let requests = orchestrator.submit().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(orchestrator.segmentation().is_in_progress());

    run(&mut orchestrator, requests, &classifier, &segmenter);

    assert_eq!(*segmenter.hints.borrow(), vec![None]);
    assert!(orchestrator.classification().is_none());
    assert_eq!(
        orchestrator.segmentation().handle().unwrap().shown,
        Shown::Segmentation(vec![5])
    );
    assert!(orchestrator.take_notification().is_some());
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
}

#[test]
fn phase_stays_submitting_until_last_parallel_leg() {
    let mut orchestrator =
        UploadOrchestrator::new(Previews::default(), SegmentationMode::Parallel);
    let classifier =
        FakeClassifier::answering(200, r#"{"predicted_result":"pituitary","confidence":75}"#);
    let segmenter =
        FakeSegmenter::answering(vec![Answer::Http(200, Some("text/html"), b"<h1>502</h1>".to_vec())]);

    orchestrator.select_image(scan());
    let mut requests = orchestrator.submit().unwrap().into_iter();
    let classify = requests.next().unwrap();
    let segment = requests.next().unwrap();

    let segmented = block_on(segment.execute(&classifier, &segmenter));
    assert!(orchestrator.apply(segmented).is_none());
    assert_eq!(orchestrator.phase(), RequestPhase::Submitting);
    assert!(orchestrator.segmentation().is_failed());

    let classified = block_on(classify.execute(&classifier, &segmenter));
    assert!(orchestrator.apply(classified).is_none());
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
    assert_eq!(orchestrator.classification().unwrap().predicted_label, "pituitary");
    assert_eq!(segmenter.calls(), 1);
}

#[test]
fn late_answers_from_superseded_cycle_are_dropped() {
    let mut orchestrator = UploadOrchestrator::new(Previews::default(), SegmentationMode::Gated);
    let classifier =
        FakeClassifier::answering(200, r#"{"predicted_result":"glioma","confidence":"87.5"}"#);
    let segmenter =
        FakeSegmenter::answering(vec![Answer::Http(200, Some("image/png"), vec![1])]);

    orchestrator.select_image(scan());
    let stale = orchestrator.submit().unwrap().remove(0);

    orchestrator.select_image(SelectedImage::new("second.png", "image/png", vec![2]));
    let fresh = orchestrator.submit().unwrap().remove(0);
    assert!(fresh.generation() > stale.generation());

    let late = block_on(stale.execute(&classifier, &segmenter));
    assert!(orchestrator.apply(late).is_none());
    assert!(orchestrator.classification().is_none());
    assert_eq!(orchestrator.phase(), RequestPhase::Submitting);

    run(&mut orchestrator, vec![fresh], &classifier, &segmenter);
    assert_eq!(orchestrator.phase(), RequestPhase::Done);
    assert_eq!(orchestrator.image().unwrap().name(), "second.png");
    assert_eq!(segmenter.calls(), 1);
}

#[test]
fn clearing_mid_flight_discards_results_and_handles() {
    let previews = Previews::default();
    let live = Rc::clone(&previews.live);
    let mut orchestrator = UploadOrchestrator::new(previews, SegmentationMode::Gated);
    let classifier =
        FakeClassifier::answering(200, r#"{"predicted_result":"glioma","confidence":"87.5"}"#);
    let segmenter = FakeSegmenter::default();

    orchestrator.select_image(scan());
    let request = orchestrator.submit().unwrap().remove(0);
    orchestrator.clear();
    assert_eq!(live.get(), 0);

    let late = block_on(request.execute(&classifier, &segmenter));
    assert!(orchestrator.apply(late).is_none());
    assert!(orchestrator.classification().is_none());
    assert_eq!(orchestrator.phase(), RequestPhase::Idle);
    assert_eq!(live.get(), 0);
}
