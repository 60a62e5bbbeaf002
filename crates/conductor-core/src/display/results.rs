//! Execution report rendering.

use std::fmt;

use super::datetime::Minutes;
use crate::scheduler::ExecutionReport;

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Plan {} {}",
            self.plan_id,
            if self.success { "completed" } else { "failed" }
        )?;
        writeln!(
            f,
            "- Tasks: {} completed, {} failed, {} blocked",
            self.completed.len(),
            self.failed.len(),
            self.blocked.len()
        )?;
        writeln!(f, "- Duration: {}", Minutes(self.duration_minutes))?;
        writeln!(f, "- Cost: {:.0} units", self.cost)?;

        if !self.outputs.is_empty() {
            writeln!(f, "- Outputs:")?;
            for output in &self.outputs {
                writeln!(f, "  - {output}")?;
            }
        }

        Ok(())
    }
}
