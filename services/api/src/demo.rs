use crate::infra::in_memory_service;
use academy::error::AppError;
use academy::workflows::recruitment::{
    Attribute, ClubProfile, DecisionOutcome, MemoryStore, Position, RecruitmentService,
    ScoringConfig, SkillAttributes, SubmitterId, TraineeId, TraineeProfile, Viewer,
};
use clap::Args;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the pass threshold (1-99) used by the demo season.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=99))]
    pub(crate) pass_threshold: Option<u8>,
    /// Stop after both clubs have accepted, without committing to a final club.
    #[arg(long)]
    pub(crate) skip_finalize: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        pass_threshold,
        skip_finalize,
    } = args;

    let mut config = ScoringConfig::default();
    if let Some(threshold) = pass_threshold {
        config.pass_threshold = threshold;
    }
    let service = in_memory_service(config);

    println!("Academy recruitment demo");
    println!("  Pass threshold: {}", config.pass_threshold);

    let trainee = service.register_trainee(TraineeProfile {
        name: "Ada Mensah".to_string(),
        birth_date: None,
        preferred_position: Some(Position::AttackingMidfielder),
        email: Some("ada@example.com".to_string()),
        phone: None,
    })?;
    println!(
        "\nRegistered trainee {} ({}) status={}",
        trainee.profile.name,
        trainee.id,
        trainee.status.label()
    );

    let sheet = SkillAttributes::uniform(72)
        .with(Attribute::Vision, 88)
        .with(Attribute::Passing, 86)
        .with(Attribute::Technique, 84)
        .with(Attribute::FirstTouch, 82)
        .with(Attribute::GkDiving, 20)
        .with(Attribute::GkHandling, 22)
        .with(Attribute::GkReflexes, 25);
    service.submit_test(
        &trainee.id,
        SubmitterId("scout-demo".to_string()),
        sheet,
        Some("Comfortable on the half turn".to_string()),
    )?;
    render_scores(&service, &trainee.id)?;

    let harbour = service.register_club(ClubProfile {
        name: "Harbour FC".to_string(),
        city: Some("Porto Azul".to_string()),
    })?;
    let northgate = service.register_club(ClubProfile {
        name: "Northgate United".to_string(),
        city: None,
    })?;

    println!("\nApplications");
    for club in [&harbour, &northgate] {
        let application = service.apply(&trainee.id, &club.id)?;
        let decided = service.decide(
            &application.id,
            DecisionOutcome::Accepted,
            Some(format!("{} would like to sign you", club.profile.name)),
        )?;
        println!(
            "  - {} -> {} ({})",
            club.profile.name,
            decided.status.label(),
            decided.id
        );
    }

    if !skip_finalize {
        let selection = service.finalize(&trainee.id, &harbour.id)?;
        println!(
            "\nFinal club: {} ({} application(s) superseded)",
            harbour.profile.name,
            selection.superseded.len()
        );
        for view in service.applications_for_trainee(&trainee.id)? {
            println!(
                "  - {} status={} feedback={}",
                view.club_id,
                view.status,
                view.feedback.as_deref().unwrap_or("-")
            );
        }
    }

    let dashboard = service.dashboard(&Viewer::Admin)?;
    println!(
        "\nDashboard: trainees={} tested={} ({:.0}%) pending={} accepted={} rejected={} team_members={}",
        dashboard.trainees,
        dashboard.tested_trainees,
        dashboard.completion_pct,
        dashboard.applications.pending,
        dashboard.applications.accepted,
        dashboard.applications.rejected,
        dashboard.team_members
    );

    Ok(())
}

fn render_scores(
    service: &RecruitmentService<MemoryStore>,
    trainee_id: &TraineeId,
) -> Result<(), AppError> {
    let report = service.trainee_report(trainee_id)?;
    println!(
        "\nSkill test: overall={} passed={}",
        report.overall_average, report.passed
    );
    println!(
        "  Physical {:>2} | Mental {:>2} | Technical {:>2} | Goalkeeper {:>2}",
        report.scores.physical,
        report.scores.mental,
        report.scores.technical,
        report.scores.goalkeeper
    );
    if let Some(fit) = report.position_fit {
        println!("  Best position: {}", fit.best_position_label);
        let mut ranked = fit.scores;
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        for entry in ranked.iter().take(3) {
            println!("    {:<22} {:>2}", entry.label, entry.score);
        }
    }
    Ok(())
}
