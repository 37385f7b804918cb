use ffit::*;

fn get_crate_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?))
}

fn req(partitions: &str, jobs: &str) -> Request {
    Request::parse(partitions, jobs).unwrap()
}

const BOTH: [Strategy; 2] = [Strategy::Scan, Strategy::Indexed];

#[test]
fn textbook_example() {
    let r = req("100,500,200,300,600", "212,417,112,426");
    for s in BOTH {
        let out = r.allocate(s);
        assert_eq!(out.allocation, vec![Some(1), Some(4), Some(1), None]);
        assert_eq!(out.original, vec![100, 500, 200, 300, 600]);
        assert_eq!(out.remaining, vec![100, 176, 200, 300, 183]);
        assert_eq!(out.status, vec![
            PartitionStatus::Free,
            PartitionStatus::PartiallyUsed,
            PartitionStatus::Free,
            PartitionStatus::Free,
            PartitionStatus::PartiallyUsed,
        ]);
    }
}

#[test]
fn exact_fit_fills_partition() {
    let out = first_fit(&[5], &[5]);
    assert_eq!(out.allocation, vec![Some(0)]);
    assert_eq!(out.remaining, vec![0]);
    assert_eq!(out.status, vec![PartitionStatus::FullyUsed]);
}

#[test]
fn oversized_job_leaves_partition_free() {
    let out = first_fit(&[10], &[11]);
    assert_eq!(out.allocation, vec![None]);
    assert_eq!(out.remaining, vec![10]);
    assert_eq!(out.status, vec![PartitionStatus::Free]);
}

#[test]
fn negative_partition_is_rejected() {
    let err = Request::parse("5,-3", "1").unwrap_err();
    assert_eq!(err, InputError::NonPositiveValue {
        field:      Field::Partitions,
        position:   2,
        value:      -3,
    });
}

#[test]
fn lowest_index_wins_over_tightest() {
    // Partition 2 would be a perfect fit; first fit still picks 0.
    for s in BOTH {
        let out = allocate(&[50, 30, 20], &[20], s);
        assert_eq!(out.allocation, vec![Some(0)]);
        assert_eq!(out.remaining, vec![30, 30, 20]);
    }
}

#[test]
fn caller_input_is_untouched() {
    let parts = vec![8, 4];
    let out = first_fit(&parts, &[4, 4, 4]);
    assert_eq!(parts, vec![8, 4]);
    assert_eq!(out.original, parts);
    assert_eq!(out.remaining, vec![0, 0]);
}

#[test]
fn empty_lists() {
    for s in BOTH {
        let out = allocate(&[], &[3, 1], s);
        assert_eq!(out.allocation, vec![None, None]);
        assert!(out.remaining.is_empty() && out.status.is_empty());

        let out = allocate(&[3, 1], &[], s);
        assert!(out.allocation.is_empty());
        assert_eq!(out.status, vec![PartitionStatus::Free; 2]);
    }
}

#[test]
fn parse_errors() {
    assert_eq!(
        parse_sizes(" 100 , 500,200 ", Field::Partitions).unwrap(),
        vec![100, 500, 200]
    );
    assert!(matches!(
        parse_sizes("", Field::Jobs),
        Err(InputError::InvalidFormat { position: 1, .. })
    ));
    assert!(matches!(
        parse_sizes("1,,2", Field::Jobs),
        Err(InputError::InvalidFormat { position: 2, .. })
    ));
    assert!(matches!(
        parse_sizes("1, 2.5", Field::Jobs),
        Err(InputError::InvalidFormat { position: 2, .. })
    ));
    assert!(matches!(
        parse_sizes("3; 4", Field::Jobs),
        Err(InputError::InvalidFormat { position: 1, .. })
    ));
    assert!(matches!(
        parse_sizes("1, 0", Field::Jobs),
        Err(InputError::NonPositiveValue { position: 2, value: 0, .. })
    ));
    // Larger than any capacity we can represent.
    assert!(matches!(
        parse_sizes("99999999999999999999999", Field::Partitions),
        Err(InputError::InvalidFormat { .. })
    ));
}

#[test]
fn partitions_are_validated_first() {
    let err = Request::parse("x", "-1").unwrap_err();
    assert_eq!(err.field(), Field::Partitions);
    let err = Request::parse("1", "-1").unwrap_err();
    assert_eq!(err.field(), Field::Jobs);
}

#[test]
fn new_rejects_zero() {
    assert!(Request::new(vec![1, 2], vec![3]).is_ok());
    assert_eq!(
        Request::new(vec![1, 2], vec![3, 0]).unwrap_err(),
        InputError::NonPositiveValue { field: Field::Jobs, position: 2, value: 0 }
    );
}

#[test]
fn runs_are_deterministic() {
    let r = req("7,3,9,1,12", "4,4,4,4,1,1,6,2");
    let first = r.allocate(Strategy::Scan);
    for _ in 0..10 {
        assert_eq!(r.allocate(Strategy::Scan), first);
        assert_eq!(r.allocate(Strategy::Indexed), first);
    }
}

#[test]
fn strategies_agree_on_random_workloads() {
    let mut rng = StdRng::seed_from_u64(0xF1257);
    for round in 0..500 {
        let w = Workload {
            partitions: rng.gen_range(0..40),
            jobs:       rng.gen_range(0..80),
            max_size:   if round % 2 == 0 { 8 } else { 1000 },
        };
        let r = random_request(&mut rng, w);
        let scan = r.allocate(Strategy::Scan);
        let indexed = r.allocate(Strategy::Indexed);
        assert_eq!(scan, indexed, "diverged on {:?}", r);

        assert_eq!(scan.allocation.len(), r.jobs().len());
        assert_eq!(scan.remaining.len(), r.partitions().len());
        for (i, (&o, &rem)) in scan.original.iter().zip(scan.remaining.iter()).enumerate() {
            assert!(rem <= o);
            let given: MemUnits = scan.jobs_in(i).iter().map(|&k| r.jobs()[k]).sum();
            assert_eq!(o - rem, given);
            assert_eq!(scan.status[i], PartitionStatus::derive(o, rem));
        }
    }
}

#[test]
fn report_textbook() {
    let r = req("100,500,200,300,600", "212,417,112,426");
    let out = r.allocate(Strategy::Scan);
    let rep = Report::new(&r, &out, Strategy::Scan);

    assert_eq!(rep.jobs[3], JobRow { number: 4, size: 426, partition: None });
    assert_eq!(rep.partitions[1].jobs, vec![1, 3]);
    assert_eq!(rep.partitions[4].jobs, vec![2]);
    assert_eq!(rep.summary, Summary {
        jobs_total:         4,
        jobs_allocated:     3,
        capacity_total:     1700,
        capacity_used:      741,
        unallocated_demand: 426,
    });

    let text = rep.render_text();
    assert!(text.starts_with("Job No.\tJob Size\tPartition No.\n1\t\t212\t\t2\n"));
    assert!(text.contains("4\t\t426\t\tNot Allocated\n"));
    assert!(text.contains("\nPartition Status:\n"));
    assert!(text.contains("Partition 2: Original=500, Remaining=176, Status=Partially Used\n"));
    assert!(text.contains("Partition 1: Original=100, Remaining=100, Status=Free\n"));
    assert!(text.contains("Jobs allocated: 3/4\n"));
    assert!(text.contains("Unallocated demand: 426 (jobs 4)\n"));

    let json: serde_json::Value = serde_json::from_str(&rep.render_json().unwrap()).unwrap();
    assert_eq!(json["jobs"][3]["partition"], serde_json::Value::Null);
    assert_eq!(json["partitions"][0]["status"], "Free");
    assert_eq!(json["strategy"], "Scan");
}

#[test]
fn report_totals_beyond_one_size() {
    // Each size fits a `MemUnits`; their sums do not.
    let r = req("18446744073709551615,1", "1");
    let rep = Report::new(&r, &r.allocate(Strategy::Scan), Strategy::Scan);
    assert_eq!(rep.summary.capacity_total, u64::MAX as MemTotal + 1);
    assert_eq!(rep.summary.capacity_used, 1);

    let r = req("1", "18446744073709551615,18446744073709551615");
    let rep = Report::new(&r, &r.allocate(Strategy::Scan), Strategy::Scan);
    assert_eq!(rep.summary.jobs_allocated, 0);
    assert_eq!(rep.summary.unallocated_demand, 2 * u64::MAX as MemTotal);
    assert!(rep.render_text().contains("Unallocated demand: 36893488147419103230 (jobs 1, 2)\n"));

    let r = req("18446744073709551615,18446744073709551615", "18446744073709551615,18446744073709551615");
    let rep = Report::new(&r, &r.allocate(Strategy::Indexed), Strategy::Indexed);
    assert_eq!(rep.summary.capacity_used, 2 * u64::MAX as MemTotal);
    assert!(rep.render_json().is_ok());
}

#[test]
fn largest_size_round_trip() {
    let max = parse_sizes("18446744073709551615", Field::Partitions).unwrap();
    assert_eq!(max, vec![u64::MAX]);
    assert!(matches!(
        parse_sizes("18446744073709551616", Field::Partitions),
        Err(InputError::InvalidFormat { position: 1, .. })
    ));

    let r = req("18446744073709551615", "18446744073709551615");
    for s in BOTH {
        let out = r.allocate(s);
        assert_eq!(out.allocation, vec![Some(0)]);
        assert_eq!(out.status, vec![PartitionStatus::FullyUsed]);
        let text = Report::new(&r, &out, s).render_text();
        assert!(text.contains("1\t\t18446744073709551615\t\t1\n"));
        assert!(text.contains("Partition 1: Original=18446744073709551615, Remaining=0, Status=Fully Used\n"));
        assert!(text.contains("Capacity used: 18446744073709551615/18446744073709551615\n"));
    }
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "Outcome of another request.")]
fn report_refuses_foreign_outcome() {
    let out = first_fit(&[5, 5], &[1]);
    Report::new(&req("5", "1"), &out, Strategy::Scan);
}

#[test]
fn report_fully_used() {
    let r = req("5", "5");
    let rep = Report::new(&r, &r.allocate(Strategy::Scan), Strategy::Scan);
    let text = rep.render_text();
    assert!(text.contains("Status=Fully Used"));
    assert!(!text.contains("Unallocated demand"));
}

#[test]
fn session_run_and_reset() {
    let mut s = Session::new();
    s.set_partitions("100,500,200,300,600");
    s.set_jobs("212,417,112,426");
    let allocated = s.run(Strategy::Scan).unwrap().summary.jobs_allocated;
    assert_eq!(allocated, 3);
    assert!(s.last_report().is_some());

    // Re-running starts over from the typed capacities.
    let again = s.run(Strategy::Indexed).unwrap().clone();
    assert_eq!(again.summary.jobs_allocated, 3);

    s.reset();
    assert_eq!(s.partitions(), "");
    assert_eq!(s.jobs(), "");
    assert!(s.last_report().is_none());
    assert!(s.run(Strategy::Scan).is_err());
}

#[test]
fn session_keeps_fields_after_rejection() {
    let mut s = Session::new();
    s.set_partitions("5,-3");
    s.set_jobs("1");
    assert!(matches!(
        s.run(Strategy::Scan),
        Err(InputError::NonPositiveValue { .. })
    ));
    assert_eq!(s.partitions(), "5,-3");
    assert!(s.last_report().is_none());

    s.set_partitions("5,3");
    assert_eq!(s.run(Strategy::Scan).unwrap().jobs[0].partition, Some(1));
}

#[test]
fn plain_text_workloads() {
    let mut path = get_crate_root().unwrap();
    path.push("tests/data/workloads.txt");
    let reqs = PlainTextParser::new(path).read_requests().unwrap();
    assert_eq!(reqs.len(), 3);
    assert_eq!(reqs[0].as_ref().unwrap().jobs(), &[212, 417, 112, 426]);
    assert_eq!(reqs[1].as_ref().unwrap().partitions(), &[5]);
    assert!(matches!(reqs[2], Err(InputError::NonPositiveValue { position: 2, .. })));
}

#[test]
fn plain_text_dangling_line() {
    let reqs = PlainTextParser::parse_text("1,2\n3\n\n# trailing\n4,5\n");
    assert_eq!(reqs.len(), 2);
    assert!(reqs[0].is_ok());
    assert!(matches!(
        reqs[1],
        Err(InputError::InvalidFormat { field: Field::Jobs, .. })
    ));
}
