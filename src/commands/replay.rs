//! # replay 子命令实现
//!
//! 把脚本中的参数变更逐条写入响应式模型。派生量通过 `Multilink`
//! 绑定到参数面板，每次重算都打印一次刷新；`begin`/`end` 之间的
//! 变更合并为一次刷新。`--project` 时晶格常数每变化一次重新投影一次，
//! 与派生量的重算相互独立。
//!
//! ## 依赖关系
//! - 使用 `cli/replay.rs` 定义的 ReplayArgs
//! - 使用 `parsers/script.rs` 解析脚本
//! - 使用 `models/simulation.rs`, `xrd/panel.rs`, `xrd/projector.rs`

use crate::cli::replay::ReplayArgs;
use crate::error::{Result, XrayError};
use crate::models::{LatticeConstants, LatticeSite, SimulationDefaults, XrayModel};
use crate::parsers::{self, Command, Step};
use crate::reactive::{Multilink, Subscription};
use crate::utils::{output, parse};
use crate::xrd::{LatticeProjector, ParameterPanel, Projection};

use std::cell::RefCell;
use std::io::{self, Read};
use std::path::Path;
use std::rc::Rc;

/// 执行 replay 命令
pub fn execute(args: ReplayArgs) -> Result<()> {
    output::print_header("Reactive Replay");

    let steps = match args.script.as_deref() {
        Some(path) if path != Path::new("-") => {
            output::print_info(&format!("Script: {}", path.display()));
            parsers::parse_script_file(path)?
        }
        _ => {
            if console::user_attended() {
                output::print_info("Reading commands from stdin (Ctrl-D to finish)");
            }
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .map_err(|e| XrayError::FileReadError {
                    path: "<stdin>".to_string(),
                    source: e,
                })?;
            parsers::parse_script(&content)?
        }
    };

    let explicit_sites = match &args.grid.sites {
        Some(list) => Some(parse::parse_sites(list)?),
        None => None,
    };

    let defaults = SimulationDefaults {
        columns: args.grid.columns,
        rows: args.grid.rows,
        ..SimulationDefaults::default()
    };

    let mut session = ReplaySession::new(defaults, true);
    if args.project {
        let projector = LatticeProjector::new(args.grid.scale)?;
        session.watch_projection(projector, explicit_sites);
    }

    session.run(&steps);

    output::print_separator();
    output::print_success(&format!(
        "Replayed {} steps with {} panel refreshes",
        count_commands(&steps),
        session.refreshes()
    ));
    if args.project {
        output::print_info(&format!(
            "{} re-projections",
            session.projections.borrow().len()
        ));
    }
    Ok(())
}

/// 晶格常数变化后的一次投影
#[derive(Debug, Clone)]
struct Reprojection {
    /// 晶格常数的版本号
    revision: u64,
    constants: LatticeConstants,
    projection: Projection,
}

/// 一次回放会话：模型、面板和它们之间的绑定
struct ReplaySession {
    model: XrayModel,
    panel: Rc<RefCell<ParameterPanel>>,
    projections: Rc<RefCell<Vec<Reprojection>>>,
    echo: bool,
    link: Multilink,
    _projection: Option<Subscription>,
}

impl ReplaySession {
    fn new(defaults: SimulationDefaults, echo: bool) -> Self {
        let model = XrayModel::new(defaults);
        let panel = Rc::new(RefCell::new(ParameterPanel::default()));

        let sink = Rc::clone(&panel);
        let link = model.link_metrics(move |metrics| {
            let mut panel = sink.borrow_mut();
            panel.apply(metrics);
            if echo {
                output::print_refresh(panel.refreshes(), &panel.lines());
            }
        });

        Self {
            model,
            panel,
            projections: Rc::new(RefCell::new(Vec::new())),
            echo,
            link,
            _projection: None,
        }
    }

    /// 晶格常数变化时重新投影，结果追加到 `projections`
    ///
    /// 未给出显式位点时使用模型晶格的当前网格。
    fn watch_projection(&mut self, projector: LatticeProjector, sites: Option<Vec<LatticeSite>>) {
        let lattice = self.model.lattice.clone();
        let log = Rc::clone(&self.projections);
        let echo = self.echo;

        let subscription = self.model.on_lattice_change(move |constants: &LatticeConstants| {
            let sites = match &sites {
                Some(sites) => sites.clone(),
                None => lattice.sites(),
            };
            match projector.project(&sites, constants) {
                Ok(projection) => {
                    let record = Reprojection {
                        revision: lattice.constants.version(),
                        constants: *constants,
                        projection,
                    };
                    if echo {
                        let p = &record.projection;
                        output::print_info(&format!(
                            "Lattice r{} ({}, {}, {}): re-projected {} atoms, xMin = {:.2}, yMin = {:.2}",
                            record.revision,
                            record.constants.x,
                            record.constants.y,
                            record.constants.z,
                            p.atom_positions.len(),
                            p.bounds.x_min,
                            p.bounds.y_min
                        ));
                    }
                    log.borrow_mut().push(record);
                }
                Err(e) => output::print_warning(&e.to_string()),
            }
        });
        self._projection = Some(subscription);
    }

    fn run(&self, steps: &[Step]) {
        for step in steps {
            match step {
                Step::Apply { line, command } => self.apply(*line, command),
                Step::Batch { steps, .. } => {
                    self.model.dispatcher().batch(|| self.run(steps));
                }
            }
        }
    }

    fn apply(&self, line: usize, command: &Command) {
        match command {
            Command::Angle(deg) => {
                self.model.source_angle.set(deg.to_radians());
            }
            Command::Wavelength(wl) => {
                self.model.source_wavelength.set(*wl);
            }
            Command::Lattice(constants) => {
                self.model.lattice.constants.set(*constants);
            }
            Command::Reset => self.model.reset(),
            Command::Show => {
                if self.echo {
                    output::print_info(&format!("line {}:", line));
                    for text in self.current_panel().lines() {
                        println!("      {}", text);
                    }
                }
            }
        }
    }

    /// 当前参数对应的面板；批处理中尚未刷新时按模型当前值临时计算
    fn current_panel(&self) -> ParameterPanel {
        if self.model.dispatcher().is_batching() {
            let mut pending = ParameterPanel::default();
            pending.apply(&self.model.metrics());
            pending
        } else {
            self.panel.borrow().clone()
        }
    }

    fn refreshes(&self) -> u64 {
        self.link.run_count()
    }
}

fn count_commands(steps: &[Step]) -> usize {
    steps
        .iter()
        .map(|step| match step {
            Step::Apply { .. } => 1,
            Step::Batch { steps, .. } => count_commands(steps),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::generate_sites;
    use crate::parsers::parse_script;
    use crate::xrd::projector::Point;

    fn replay(script: &str) -> ReplaySession {
        let steps = parse_script(script).unwrap();
        let session = ReplaySession::new(SimulationDefaults::default(), false);
        session.run(&steps);
        session
    }

    #[test]
    fn test_initial_refresh() {
        let session = replay("");
        assert_eq!(session.refreshes(), 1);
        assert_eq!(session.panel.borrow().lines()[0], "Incident angle θ = 30.0°");
    }

    #[test]
    fn test_each_change_refreshes() {
        let session = replay("angle 45\nwavelength 2\nlattice 4,0,5\n");
        assert_eq!(session.refreshes(), 4);
        assert_eq!(session.panel.borrow().lines()[2], "λ = 2.0 Å");
    }

    #[test]
    fn test_batch_refreshes_once() {
        let session = replay("begin\nangle 30\nwavelength 2\nlattice 4,0,5\nend\n");
        assert_eq!(session.refreshes(), 2);

        let panel = session.panel.borrow();
        let lines = panel.lines();
        assert_eq!(lines[1], "a = 4.0 Å   b = d = 5.0 Å");
        assert_eq!(lines[3], "2d sin(θ) = 5.0 Å");
        assert_eq!(lines[4], "2d sin(θ)/λ = 2.50");
    }

    #[test]
    fn test_unchanged_value_does_not_refresh() {
        let session = replay("wavelength 8\nlattice 8,0,6\n");
        assert_eq!(session.refreshes(), 1);
    }

    #[test]
    fn test_zero_wavelength_placeholder() {
        let session = replay("wavelength 0\n");
        assert_eq!(session.panel.borrow().lines()[4], "2d sin(θ)/λ = ?");
    }

    #[test]
    fn test_reset_restores_panel() {
        let session = replay("angle 60\nreset\n");
        assert_eq!(session.refreshes(), 3);
        assert_eq!(session.panel.borrow().lines()[0], "Incident angle θ = 30.0°");
    }

    fn replay_projected(script: &str, sites: Option<Vec<LatticeSite>>) -> ReplaySession {
        let steps = parse_script(script).unwrap();
        let mut session = ReplaySession::new(SimulationDefaults::default(), false);
        session.watch_projection(LatticeProjector::default(), sites);
        session.run(&steps);
        session
    }

    #[test]
    fn test_reprojection_per_lattice_change() {
        let session = replay_projected(
            "lattice 4,0,5\nangle 45\nwavelength 2\nbegin\nangle 10\nlattice 2,0,3\nend\nlattice 2,0,3\n",
            None,
        );
        let log = session.projections.borrow();

        assert_eq!(log.len(), 2);
        assert_eq!(log[0].constants, LatticeConstants::new(4.0, 0.0, 5.0));
        assert_eq!(log[0].revision, 1);
        assert_eq!(log[1].constants, LatticeConstants::new(2.0, 0.0, 3.0));
        assert_eq!(log[1].revision, 2);

        let c = log[1].constants;
        let expected = LatticeProjector::default()
            .project(&generate_sites(&c, 7, 4), &c)
            .unwrap();
        assert_eq!(log[1].projection, expected);
        assert_eq!(log[1].projection.atom_positions.len(), 28);

        // build + lattice + angle + wavelength + batch
        assert_eq!(session.refreshes(), 5);
    }

    #[test]
    fn test_reprojection_ignores_source_changes() {
        let session = replay_projected("angle 45\nbegin\nwavelength 2\nangle 10\nend\n", None);
        assert!(session.projections.borrow().is_empty());
        assert_eq!(session.refreshes(), 3);
    }

    #[test]
    fn test_reprojection_uses_explicit_sites() {
        let sites = vec![LatticeSite::new(-2.0, -3.0)];
        let session = replay_projected("lattice 4,0,5\nreset\n", Some(sites));
        let log = session.projections.borrow();

        assert_eq!(log.len(), 2);
        let first = &log[0].projection;
        assert_eq!(first.atom_positions, vec![Point::new(-16.0, -24.0)]);
        assert_eq!(first.annotations.a_arrow.tip, Point::new(16.0, 40.0));

        // reset restores (8, 0, 6)
        assert_eq!(log[1].constants, LatticeConstants::default());
        assert_eq!(log[1].projection.annotations.d_arrow.tip, Point::new(-16.0, 24.0));
    }

    #[test]
    fn test_current_panel_inside_batch() {
        let session = replay("");
        session.model.dispatcher().batch(|| {
            session.model.source_wavelength.set(2.0);
            assert_eq!(session.panel.borrow().lines()[2], "λ = 8.0 Å");
            assert_eq!(session.current_panel().lines()[2], "λ = 2.0 Å");
        });
        assert_eq!(session.current_panel().lines()[2], "λ = 2.0 Å");
    }

    #[test]
    fn test_count_commands_nested() {
        let steps = parse_script("angle 1\nbegin\nangle 2\nbegin\nshow\nend\nend\n").unwrap();
        assert_eq!(count_commands(&steps), 3);
    }
}
