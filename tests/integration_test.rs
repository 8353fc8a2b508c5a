//! Integration tests.
//!
//! Tests cover:
//! - Full pipeline with a mock data port
//! - Hand-checked crossover scenarios
//! - Parameter sweeps with failing combinations
//! - CSV + INI end-to-end run through the adapters

mod common;

use approx::assert_abs_diff_eq;
use common::*;
use crosstrader::adapters::csv_adapter::CsvAdapter;
use crosstrader::adapters::file_config_adapter::FileConfigAdapter;
use crosstrader::domain::backtest::{BacktestConfig, run_backtest, run_backtest_for_symbol};
use crosstrader::domain::config_validation::{
    build_backtest_config, build_strategy, configured_symbol,
};
use crosstrader::domain::error::BacktestError;
use crosstrader::domain::indicator::rsi::calculate_rsi;
use crosstrader::domain::metrics::max_drawdown;
use crosstrader::domain::portfolio::{equity_curve, strategy_returns};
use crosstrader::domain::position::{Position, resolve_positions};
use crosstrader::domain::signal::{Signal, SignalPoint, SignalSeries};
use crosstrader::domain::strategy::Strategy;
use crosstrader::domain::sweep::{ParamGrid, rank_by_sharpe, run_sweep};
use crosstrader::ports::data_port::DataPort;

mod full_backtest_pipeline {
    use super::*;

    #[test]
    fn runs_through_mock_data_port() {
        let port = MockDataPort::new().with_prices("SPY", make_points(&wave_closes(200)));
        let strategy = Strategy::sma_crossover(5, 20);

        let result =
            run_backtest_for_symbol(&port, "SPY", &strategy, &BacktestConfig::default()).unwrap();

        assert_eq!(result.symbol, "SPY");
        assert_eq!(result.signals.len(), 200 - 19);
        assert_eq!(result.positions.len(), result.signals.len());
        assert_eq!(result.returns.len(), result.signals.len());
        assert_eq!(result.equity.points.len(), result.signals.len());
        assert_eq!(result.positions.last(), Some(Position::Flat));
        assert_eq!(result.metadata.strategy, "SMA crossover (5/20)");
    }

    #[test]
    fn respects_configured_date_range() {
        let port = MockDataPort::new().with_prices("SPY", make_points(&wave_closes(365)));
        let config = BacktestConfig {
            start_date: Some(date(2024, 3, 1)),
            end_date: Some(date(2024, 9, 30)),
            ..BacktestConfig::default()
        };

        let result =
            run_backtest_for_symbol(&port, "SPY", &Strategy::sma_crossover(5, 20), &config)
                .unwrap();

        let first = result.signals.first_date().unwrap();
        let last = result.equity.points.last().unwrap().date;
        assert!(first >= date(2024, 3, 1));
        assert_eq!(last, date(2024, 9, 30));
    }

    #[test]
    fn data_port_errors_propagate() {
        let port = MockDataPort::new().with_error("BAD", "connection refused");
        let err = run_backtest_for_symbol(
            &port,
            "BAD",
            &Strategy::sma_crossover(5, 20),
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BacktestError::Data { reason } if reason == "connection refused"));
    }

    #[test]
    fn invalid_config_is_rejected_before_fetch() {
        let port = MockDataPort::new().with_error("SPY", "should not be called");
        let config = BacktestConfig {
            initial_wealth: -1.0,
            ..BacktestConfig::default()
        };
        let err = run_backtest_for_symbol(&port, "SPY", &Strategy::sma_crossover(5, 20), &config)
            .unwrap_err();
        assert!(matches!(err, BacktestError::InvalidParameter { .. }));
    }

    #[test]
    fn same_inputs_give_identical_results() {
        let prices = make_prices("SPY", &wave_closes(250));
        let strategy = Strategy::rsi_band(14, 30.0, 70.0);
        let config = sample_config();

        let first = run_backtest(&prices, &strategy, &config);
        let second = run_backtest(&prices, &strategy, &config);

        match (first, second) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
            (a, b) => panic!("runs diverged: {a:?} vs {b:?}"),
        }
    }

    #[test]
    fn equity_matches_compounded_returns() {
        let prices = make_prices("SPY", &wave_closes(300));
        let config = BacktestConfig {
            initial_wealth: 2500.0,
            ..BacktestConfig::default()
        };
        let result = run_backtest(&prices, &Strategy::sma_crossover(10, 30), &config).unwrap();

        let compounded: f64 = result
            .returns
            .values()
            .iter()
            .map(|r| 1.0 + r)
            .product::<f64>()
            * 2500.0;
        assert_abs_diff_eq!(result.equity.final_equity(), compounded, epsilon = 1e-9);
    }
}

mod crossover_scenarios {
    use super::*;

    #[test]
    fn alternating_crosses_trade_every_day() {
        // slow SMA(2): [-, 101, 101.5, 103, 104]
        let prices = make_prices("TEST", &[100.0, 102.0, 101.0, 105.0, 103.0]);
        let result = run_backtest(
            &prices,
            &Strategy::sma_crossover(1, 2),
            &BacktestConfig::default(),
        )
        .unwrap();

        let signals: Vec<i8> = result.signals.signals().map(Signal::as_i8).collect();
        assert_eq!(signals, vec![1, -1, 1, -1]);
        assert_eq!(result.signals.first_date(), Some(date(2024, 1, 2)));

        let rets = result.returns.values();
        assert_abs_diff_eq!(rets[0], 0.0);
        assert_abs_diff_eq!(rets[1], 101.0 / 102.0 - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rets[2], 0.0);
        assert_abs_diff_eq!(rets[3], 103.0 / 105.0 - 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            result.equity.final_equity(),
            1000.0 * (101.0 / 102.0) * (103.0 / 105.0),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(result.metrics.win_rate, 0.0);
        assert_abs_diff_eq!(result.metrics.profit_factor, 0.0);
    }

    #[test]
    fn dangling_buy_is_sold_on_final_date() {
        let prices = make_prices("TEST", &[100.0, 102.0, 101.0, 105.0, 103.0]);
        let signals = SignalSeries::new(
            prices
                .points()
                .iter()
                .enumerate()
                .map(|(i, p)| SignalPoint {
                    date: p.date,
                    signal: if i == 1 { Signal::Buy } else { Signal::Hold },
                })
                .collect(),
        );

        let positions = resolve_positions(&signals).unwrap();
        let held: Vec<Position> = positions.positions().collect();
        assert_eq!(
            held,
            vec![
                Position::Flat,
                Position::Long,
                Position::Long,
                Position::Long,
                Position::Flat
            ]
        );

        let returns = strategy_returns(&prices, &positions).unwrap();
        let equity = equity_curve(&returns, 1000.0);
        assert_abs_diff_eq!(equity.final_equity(), 1000.0 * 103.0 / 102.0, epsilon = 1e-9);
    }

    #[test]
    fn rsi_over_length_plus_one_rising_days() {
        let prices = make_prices("UP", &[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let rsi = calculate_rsi(&prices, 5).unwrap();

        assert_eq!(rsi.values.iter().filter(|p| p.value.is_some()).count(), 1);
        assert_eq!(rsi.values[5].value, Some(100.0));
    }

    #[test]
    fn too_short_history_is_empty_signal() {
        let prices = make_prices("TEST", &[100.0, 101.0, 102.0]);
        let err = run_backtest(
            &prices,
            &Strategy::sma_crossover(2, 10),
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BacktestError::EmptySignal));
    }

    #[test]
    fn fast_not_below_slow_is_invalid() {
        let prices = make_prices("TEST", &wave_closes(50));
        for (fast, slow) in [(20, 10), (10, 10)] {
            let err = run_backtest(
                &prices,
                &Strategy::sma_crossover(fast, slow),
                &BacktestConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, BacktestError::InvalidParameter { .. }));
        }
    }

    #[test]
    fn strictly_rising_prices_give_rsi_of_100() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let prices = make_prices("UP", &closes);

        let rsi = calculate_rsi(&prices, 14).unwrap();

        assert!(rsi.values[..14].iter().all(|p| p.value.is_none()));
        for point in &rsi.values[14..] {
            assert_abs_diff_eq!(point.value.unwrap(), 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn rally_without_losing_days_has_no_profit_factor() {
        // slow SMA(2): [-, 99.5, 98.5, 98.5, 99.5, 100.5, 101.5, 102.5]
        // long from day 4, every held day gains
        let prices = make_prices(
            "UP",
            &[100.0, 99.0, 98.0, 99.0, 100.0, 101.0, 102.0, 103.0],
        );

        let err = run_backtest(
            &prices,
            &Strategy::sma_crossover(1, 2),
            &BacktestConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            BacktestError::DegenerateStatistic {
                metric: "profit_factor",
                ..
            }
        ));
    }

    #[test]
    fn rsi_pinned_above_band_never_trades() {
        // RSI(3) is 100 from its first defined row, so there is no rising edge
        let closes: Vec<f64> = (0..11).map(|i| 100.0 + i as f64).collect();
        let prices = make_prices("UP", &closes);

        let err = run_backtest(
            &prices,
            &Strategy::rsi_band(3, 30.0, 70.0),
            &BacktestConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, BacktestError::EmptySignal));
    }

    #[test]
    fn drawdown_scenarios() {
        assert_eq!(max_drawdown(&[1000.0, 1010.0, 1020.0, 1030.0]).unwrap(), 0.0);
        assert_abs_diff_eq!(
            max_drawdown(&[1000.0, 1200.0, 900.0, 1100.0]).unwrap(),
            0.25,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            max_drawdown(&[1000.0, 500.0, 2000.0, 1500.0]).unwrap(),
            0.5,
            epsilon = 1e-12
        );
    }
}

mod parameter_sweep {
    use super::*;

    #[test]
    fn failing_combination_does_not_abort_others() {
        let prices = make_prices("SPY", &wave_closes(300));
        let strategies = ParamGrid::sma_crossover(&[5, 30], &[20, 60]);

        let outcomes = run_sweep(&prices, &strategies, &BacktestConfig::default());

        assert_eq!(outcomes.len(), 4);
        let failed: Vec<&Strategy> = outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| &o.strategy)
            .collect();
        assert_eq!(failed, vec![&Strategy::sma_crossover(30, 20)]);
    }

    #[test]
    fn sweep_matches_individual_runs() {
        let prices = make_prices("SPY", &wave_closes(300));
        let strategies = ParamGrid::rsi_band(&[7, 14], &[(30.0, 70.0), (40.0, 60.0)]);
        let config = BacktestConfig::default();

        let outcomes = run_sweep(&prices, &strategies, &config);

        for outcome in &outcomes {
            let single = run_backtest(&prices, &outcome.strategy, &config);
            assert_eq!(outcome.result.as_ref().ok(), single.as_ref().ok());
        }
    }

    #[test]
    fn ranking_orders_by_sharpe() {
        let prices = make_prices("SPY", &wave_closes(300));
        let strategies = ParamGrid::sma_crossover(&[3, 5, 10], &[20, 40]);

        let outcomes = run_sweep(&prices, &strategies, &BacktestConfig::default());
        let ranked = rank_by_sharpe(&outcomes);

        assert!(!ranked.is_empty());
        let sharpes: Vec<f64> = ranked
            .iter()
            .map(|o| o.metrics().unwrap().sharpe_ratio)
            .collect();
        assert!(sharpes.windows(2).all(|w| w[0] >= w[1]));
    }
}

mod csv_and_ini_end_to_end {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, symbol: &str, closes: &[f64]) {
        let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
        for point in make_points(closes) {
            content.push_str(&format!(
                "{},{:.4},{:.4},{:.4},{:.4},{:.6},1000\n",
                point.date,
                point.adj_close,
                point.adj_close + 1.0,
                point.adj_close - 1.0,
                point.adj_close,
                point.adj_close
            ));
        }
        fs::write(dir.path().join(format!("{}.csv", symbol)), content).unwrap();
    }

    #[test]
    fn config_file_drives_csv_backtest() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "SPY", &wave_closes(240));
        let ini_path = dir.path().join("backtest.ini");
        fs::write(
            &ini_path,
            "[backtest]\n\
             symbol = SPY\n\
             start_date = 2024-02-01\n\
             end_date = 2024-07-31\n\
             initial_wealth = 10000\n\
             \n\
             [strategy]\n\
             kind = sma_crossover\n\
             fast = 5\n\
             slow = 20\n",
        )
        .unwrap();

        let ini = FileConfigAdapter::from_file(&ini_path).unwrap();
        let config = build_backtest_config(&ini).unwrap();
        let strategy = build_strategy(&ini).unwrap();
        let symbol = configured_symbol(&ini).unwrap();
        let data = CsvAdapter::new(dir.path().to_path_buf());

        assert_eq!(data.list_symbols().unwrap(), vec!["SPY"]);

        let result = run_backtest_for_symbol(&data, &symbol, &strategy, &config).unwrap();

        assert_eq!(result.equity.initial_wealth, 10000.0);
        assert!(result.signals.first_date().unwrap() >= date(2024, 2, 1));
        assert_eq!(result.equity.points.last().unwrap().date, date(2024, 7, 31));
        assert_eq!(result.positions.last(), Some(Position::Flat));

        let in_memory = data
            .fetch_prices("SPY", date(2024, 2, 1), date(2024, 7, 31))
            .unwrap();
        let direct = run_backtest(&in_memory, &strategy, &config).unwrap();
        assert_eq!(result, direct);
    }

    #[test]
    fn missing_price_column_surfaces() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("RAW.csv"), "date,close\n2024-01-01,1.0\n").unwrap();
        let data = CsvAdapter::new(dir.path().to_path_buf());

        let err = run_backtest_for_symbol(
            &data,
            "RAW",
            &Strategy::sma_crossover(1, 2),
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BacktestError::MissingColumn { .. }));
    }
}
