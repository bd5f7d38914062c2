use chainring::{
    text::{
        self, IntensityThresholds, LineError, ParseError, ParseOptions, WarningKind,
        token::{self, duration},
    },
    workout::{
        Bounds, HeartRateUnit, Intensity, Repetition, StepKind, Target, TargetKind, WorkoutStep,
    },
};

fn steps(text: &str) -> Vec<WorkoutStep> {
    let parse = text::parse(text);
    assert!(parse.errors.is_empty(), "{:?}", parse.errors);
    parse.workout.unwrap().steps
}

fn line_error(text: &str) -> LineError {
    match text::parse(text).errors.as_slice() {
        [ParseError::Line { error, .. }, ..] => error.clone(),
        errors => panic!("expected a line error, found {errors:?}"),
    }
}

#[test]
fn duration_units() {
    assert_eq!(duration("45s"), Some(45.0));
    assert_eq!(duration("45sec"), Some(45.0));
    assert_eq!(duration("5m"), Some(300.0));
    assert_eq!(duration("5min"), Some(300.0));
    assert_eq!(duration("5"), Some(300.0));
    assert_eq!(duration("1.5h"), Some(5400.0));
    assert_eq!(duration("2hr"), Some(7200.0));
    assert_eq!(duration("2MIN"), Some(120.0));
    assert_eq!(duration("10minutes"), Some(600.0));

    assert_eq!(duration("min"), None);
    assert_eq!(duration("5days"), None);
    assert_eq!(duration("-5min"), None);
    assert_eq!(duration("1.2.3min"), None);
}

#[test]
fn fractional_durations_round_to_seconds() {
    let steps = steps("0.33min 60%");
    assert_eq!(steps[0].duration_seconds, 20);
}

#[test]
fn spaced_unit() {
    let steps = steps("10 min 60%");
    assert_eq!(steps[0].duration_seconds, 600);
}

#[test]
fn steady_power() {
    let steps = steps("5min 50% FTP");

    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].duration_seconds, 300);
    assert_eq!(steps[0].power_low(), Some(50));
    assert_eq!(steps[0].power_high(), Some(50));
    assert_eq!(steps[0].kind, StepKind::Steady);
    assert_eq!(steps[0].intensity, Intensity::Active);
}

#[test]
fn power_ramp() {
    let steps = steps("5min 85-95% FTP");

    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].power(), Some(Bounds::new(85, 95)));
    assert_eq!(steps[0].kind, StepKind::Ramp);
    assert_eq!(steps[0].intensity, Intensity::Interval);
}

#[test]
fn power_range_forms() {
    for line in [
        "5min 85%-95%",
        "5min 85 - 95%",
        "5min 85% - 95% FTP",
        "5min 85–95%",
        "5min 85-95% of FTP",
    ] {
        let steps = steps(line);
        assert_eq!(steps[0].power(), Some(Bounds::new(85, 95)), "{line}");
    }
}

#[test]
fn derived_intensity() {
    assert_eq!(steps("5min 40%")[0].intensity, Intensity::Rest);
    assert_eq!(steps("5min 75%")[0].intensity, Intensity::Active);
    assert_eq!(steps("5min 110%")[0].intensity, Intensity::Interval);
}

#[test]
fn configurable_thresholds() {
    let options = ParseOptions {
        thresholds: IntensityThresholds {
            rest_below: 60,
            active_below: 100,
        },
        ..Default::default()
    };

    let workout = text::parse_with("5min 55%\n5min 95%", &options).workout.unwrap();
    assert_eq!(workout.steps[0].intensity, Intensity::Rest);
    assert_eq!(workout.steps[1].intensity, Intensity::Active);
}

#[test]
fn keyword_overrides_intensity() {
    assert_eq!(steps("5min 95% tempo")[0].intensity, Intensity::Active);
    assert_eq!(steps("5min 60% VO2max")[0].intensity, Intensity::Interval);
    assert_eq!(steps("5min 60% easy sprint")[0].intensity, Intensity::Rest);
}

#[test]
fn repeats_unroll() {
    let steps = steps("3x 5min 95% FTP");

    assert_eq!(steps.len(), 3);
    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step.duration_seconds, 300);
        assert_eq!(step.power(), Some(Bounds::steady(95)));
        assert_eq!(
            step.repetition,
            Some(Repetition {
                index: i as u16,
                count: 3
            })
        );
    }

    let strip = |s: &WorkoutStep| WorkoutStep {
        repetition: None,
        ..s.clone()
    };
    assert_eq!(strip(&steps[0]), strip(&steps[1]));
    assert_eq!(strip(&steps[1]), strip(&steps[2]));
}

#[test]
fn repeat_prefix_forms() {
    assert_eq!(steps("4 x 1min 120%").len(), 4);
    assert_eq!(steps("2X 1min 120%").len(), 2);
    assert_eq!(line_error("0x 1min 120%"), LineError::InvalidRepeat("0x".into()));
}

#[test]
fn warmup_block() {
    let steps = steps("warmup 10min");

    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].duration_seconds, 600);
    assert_eq!(steps[0].power(), Some(Bounds::new(40, 75)));
    assert_eq!(steps[0].intensity, Intensity::Warmup);
    assert_eq!(steps[0].kind, StepKind::Warmup);
    assert_eq!(steps[0].name.as_deref(), Some("Warmup"));
    assert_eq!(
        steps[0].note.as_deref(),
        Some("Easy spin, gradually increase effort")
    );
}

#[test]
fn special_blocks() {
    let steps = steps("Cool-down 5min\nrecovery 2min\nrest 30s\nfree ride 20min");

    assert_eq!(steps[0].power(), Some(Bounds::new(65, 40)));
    assert_eq!(steps[0].intensity, Intensity::Warmup);
    assert_eq!(steps[0].kind, StepKind::Cooldown);

    assert_eq!(steps[1].power(), Some(Bounds::steady(50)));
    assert_eq!(steps[1].intensity, Intensity::Rest);
    assert_eq!(steps[2].kind, StepKind::Recovery);
    assert_eq!(steps[2].duration_seconds, 30);

    assert_eq!(steps[3].target, Target::Open);
    assert_eq!(steps[3].kind, StepKind::Open);

    let notes: Vec<_> = steps.iter().map(|s| s.note.as_deref()).collect();
    assert_eq!(
        notes,
        [
            Some("Easy spin, relax"),
            Some("Easy spinning, recover"),
            Some("Easy spinning, recover"),
            Some("Ride at your own pace"),
        ]
    );
}

#[test]
fn special_block_ignores_repeat_and_trailing_tokens() {
    let parse = text::parse("3x warmup 10min 120% whatever");
    let steps = parse.workout.unwrap().steps;

    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].power(), Some(Bounds::new(40, 75)));
    assert_eq!(steps[0].repetition, None);
    assert_eq!(parse.warnings.len(), 1);
    assert_eq!(parse.warnings[0].kind, WarningKind::IgnoredRepeat(3));
}

#[test]
fn special_keyword_needs_word_boundary() {
    assert_eq!(line_error("restful 10min"), LineError::InvalidDuration("restful".into()));
}

#[test]
fn heart_rate_targets() {
    let steps = steps(
        "10min 75% HR\n10min 70-80%HR\n10min 150bpm\n10min 140-150 bpm\n10min 75% max HR\n10min 70-80% maxHR",
    );

    assert_eq!(
        steps[0].target,
        Target::HeartRate(Bounds::steady(75), HeartRateUnit::PercentOfMax)
    );
    assert_eq!(
        steps[1].target,
        Target::HeartRate(Bounds::new(70, 80), HeartRateUnit::PercentOfMax)
    );
    assert_eq!(
        steps[2].target,
        Target::HeartRate(Bounds::steady(150), HeartRateUnit::BeatsPerMinute)
    );
    assert_eq!(
        steps[3].target,
        Target::HeartRate(Bounds::new(140, 150), HeartRateUnit::BeatsPerMinute)
    );
    assert_eq!(
        steps[4].target,
        Target::HeartRate(Bounds::steady(75), HeartRateUnit::PercentOfMax)
    );
    assert_eq!(
        steps[5].target,
        Target::HeartRate(Bounds::new(70, 80), HeartRateUnit::PercentOfMax)
    );
    assert!(steps.iter().all(|s| s.kind == StepKind::Steady));
}

#[test]
fn cadence_targets() {
    let steps = steps("5min 90% @95rpm\n5min @80-90RPM");

    assert_eq!(steps[0].power(), Some(Bounds::steady(90)));
    assert_eq!(steps[0].cadence, Some(Bounds::steady(95)));

    assert_eq!(steps[1].target, Target::Cadence(Bounds::new(80, 90)));
    assert_eq!(steps[1].cadence, None);
}

#[test]
fn target_kinds() {
    let steps = steps("5min 90%
5min 150bpm
5min @90rpm
5min open");
    let kinds: Vec<TargetKind> = steps.iter().map(|s| s.target.kind()).collect();

    assert_eq!(
        kinds,
        [
            TargetKind::Power,
            TargetKind::HeartRate,
            TargetKind::Cadence,
            TargetKind::Open
        ]
    );
}

#[test]
fn open_step() {
    let steps = steps("20min open @85rpm");

    assert_eq!(steps[0].target, Target::Open);
    assert_eq!(steps[0].kind, StepKind::Open);
    assert_eq!(steps[0].cadence, Some(Bounds::steady(85)));
}

#[test]
fn notes() {
    let steps = steps("3x 5min \"stay seated\" 95%\nwarmup 10min \"spin up\"");

    assert!(steps[..3].iter().all(|s| s.note.as_deref() == Some("stay seated")));
    assert_eq!(steps[3].note.as_deref(), Some("spin up"));
}

#[test]
fn heart_rate_wording_leaves_no_warnings() {
    let parse = text::parse("10min 75% max HR\n10min 90% of FTP");

    assert!(parse.warnings.is_empty(), "{:?}", parse.warnings);
    assert_eq!(parse.workout.unwrap().steps[1].power(), Some(Bounds::steady(90)));
}

#[test]
fn two_word_keywords() {
    let parse = text::parse("20min 95% sweet spot");

    assert!(parse.warnings.is_empty(), "{:?}", parse.warnings);
    assert_eq!(parse.workout.unwrap().steps[0].intensity, Intensity::Active);

    let parse = text::parse("5min 60% sweet");
    assert_eq!(parse.warnings[0].kind, WarningKind::UnknownToken("sweet".into()));
}

#[test]
fn unknown_tokens_warn() {
    let parse = text::parse("5min 90% hard");

    assert!(parse.is_success());
    assert_eq!(parse.warnings.len(), 1);
    assert_eq!(parse.warnings[0].line, 1);
    assert_eq!(parse.warnings[0].kind, WarningKind::UnknownToken("hard".into()));
    assert_eq!(
        parse.warnings[0].to_string(),
        "Line 1: Unrecognised 'hard' ignored."
    );
}

#[test]
fn line_errors() {
    assert_eq!(line_error("fast 90%"), LineError::InvalidDuration("fast".into()));
    assert_eq!(line_error("0min 90%"), LineError::ZeroDuration);
    assert_eq!(line_error("5min"), LineError::MissingTarget("5min".into()));
    assert_eq!(line_error("5min 9x%"), LineError::InvalidTarget("9x%".into()));
    assert_eq!(line_error("5min 90% @fast"), LineError::InvalidTarget("@fast".into()));
    assert_eq!(line_error("warmup"), LineError::MissingDuration("warmup".into()));
}

#[test]
fn bad_lines_are_skipped() {
    let parse = text::parse("# intervals\n5min 60%\n\nnonsense here\n3x 1min 120%");

    assert!(parse.is_success());
    assert_eq!(parse.workout.unwrap().steps.len(), 4);
    assert_eq!(
        parse.errors,
        [ParseError::Line {
            line: 4,
            error: LineError::InvalidDuration("nonsense".into()),
        }]
    );
    assert_eq!(
        parse.errors[0].to_string(),
        "Line 4: Invalid duration 'nonsense'."
    );
}

#[test]
fn empty_input() {
    for input in ["", "   \n\t\n"] {
        let parse = text::parse(input);
        assert!(parse.workout.is_none());
        assert_eq!(parse.errors, [ParseError::EmptyInput]);
    }
}

#[test]
fn comments_only() {
    let parse = text::parse("# warmup 10min\n// 5min 90%");

    assert!(parse.workout.is_none());
    assert_eq!(parse.errors, [ParseError::NoSteps]);
    assert_eq!(
        parse.errors[0].to_string(),
        "No valid workout steps found."
    );
}

#[test]
fn no_valid_lines() {
    let parse = text::parse("hello\nworld");

    assert!(parse.workout.is_none());
    assert_eq!(parse.errors.len(), 3);
    assert_eq!(parse.errors[2], ParseError::NoSteps);
}

#[test]
fn options_reach_workout() {
    let options = ParseOptions {
        name: "Sweet Spot".into(),
        ftp: Some(250),
        max_heart_rate: Some(185),
        ..Default::default()
    };

    let workout = text::parse_with("warmup 10min\n2x 20min 90%", &options)
        .workout
        .unwrap();

    assert_eq!(workout.name, "Sweet Spot");
    assert_eq!(workout.ftp, Some(250));
    assert_eq!(workout.max_heart_rate, Some(185));
    assert_eq!(workout.total_duration_seconds(), 3000);
    assert_eq!(workout.total_duration_formatted(), "50:00");
}

#[test]
fn default_name() {
    let workout = text::parse("5min 90%").workout.unwrap();
    assert_eq!(workout.name, "Custom Workout");
}

#[test]
fn presentation() {
    let workout = text::parse("1h 90-100% @90rpm \"go\"").workout.unwrap();
    let step = &workout.steps[0];

    assert_eq!(step.label(), "Ramp 90%-100%");
    assert_eq!(
        step.describe(Some(200), None),
        "1.0h 90-100% FTP (180-200W) @90rpm \"go\""
    );
}

#[test]
fn token_power() {
    assert_eq!(token::power(&["90%"]), Some((Bounds::steady(90), 1)));
    assert_eq!(token::power(&["90%", "FTP", "x"]), Some((Bounds::steady(90), 2)));
    assert_eq!(token::power(&["85", "-", "95%"]), Some((Bounds::new(85, 95), 3)));
    assert_eq!(token::power(&["90"]), None);
    assert_eq!(token::power(&["abc%"]), None);
}
