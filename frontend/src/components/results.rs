use super::super::{Model, Msg};
use shared::{ClassificationResult, RequestPhase, SegmentationOutcome};
use yew::prelude::*;

const DEFAULT_RECOMMENDATION: &str = "Consult a medical professional for further evaluation.";

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let orchestrator = &model.orchestrator;

    match orchestrator.classification() {
        Some(classification) => html! {
            <>
                { render_classification(classification) }
                { render_segmentation(model, ctx) }
            </>
        },
        None if orchestrator.phase() == RequestPhase::Submitting => html! {
            <div class="results-container">
                <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                <p class="no-results-message">{"Analyzing the scan..."}</p>
            </div>
        },
        // Parallel mode may segment even though classification failed
        None if !matches!(orchestrator.segmentation(), SegmentationOutcome::NotStarted) => {
            render_segmentation(model, ctx)
        }
        None => html! {
            <div class="results-container">
                <p class="no-results-message">{"Analysis results will appear here"}</p>
                <p class="file-types">{"Upload an MRI scan to begin diagnosis"}</p>
            </div>
        },
    }
}

fn render_classification(classification: &ClassificationResult) -> Html {
    let no_tumor = classification.indicates_no_tumor();
    let confidence = classification.confidence;
    let recommendation = classification
        .message
        .clone()
        .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string());

    html! {
        <div class={classes!("results-container", if no_tumor { "not-detected" } else { "detected" })}>
            <div class="result-header">
                <h2>{"Analysis Results"}</h2>
                <div class="result-item">
                    <div class="result-label">{"Diagnosis"}</div>
                    <div class="result-value">
                        {
                            if no_tumor {
                                html! { <><i class="fa-solid fa-circle-check"></i>{" No Tumor Found"}</> }
                            } else {
                                html! {
                                    <><i class="fa-solid fa-triangle-exclamation"></i>
                                    { format!(" Tumor Detected: {}", classification.predicted_label) }</>
                                }
                            }
                        }
                    </div>
                </div>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence Level:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", confidence)}></div>
                    </div>
                    <div class="meter-value">{format!("{}%", confidence.round())}</div>
                </div>
            </div>
            <div class="detailed-results">
                <h3>{"Recommendation"}</h3>
                <p>{ recommendation }</p>
            </div>
        </div>
    }
}

fn render_segmentation(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();

    let body = match model.orchestrator.segmentation() {
        SegmentationOutcome::NotStarted => return html! {},
        SegmentationOutcome::InProgress => html! {
            <div class="loading-preview">
                <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                <p style="margin-left: 10px;">{"Segmenting tumor region..."}</p>
            </div>
        },
        SegmentationOutcome::Succeeded(url) => html! {
            <img id="segmentation-image" src={url.to_string()} alt="Segmentation" />
        },
        SegmentationOutcome::Failed(message) => html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ message }</p>
                <button
                    class="analyze-btn"
                    disabled={!model.orchestrator.can_retry_segmentation()}
                    onclick={link.callback(|_| Msg::RetrySegmentation)}
                >
                    <i class="fa-solid fa-rotate-right"></i>{" Retry segmentation"}
                </button>
            </div>
        },
    };

    html! {
        <div class="results-container segmentation">
            <h3>{"Tumor Segmentation"}</h3>
            { body }
        </div>
    }
}
