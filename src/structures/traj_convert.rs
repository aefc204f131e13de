// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of trajectory analyzers.

use std::marker::PhantomData;

use crate::{errors::TrajAnalysisError, io::traj_io::TrajMasterRead, system::System};

/// A generic structure for trajectory analyzers.
///
/// Trajectory analyzer can be built on top of any trajectory iterator.
/// Analyzer allows iterating through a trajectory while analyzing each frame
/// and returning a computed property associated with it.
pub struct TrajAnalyzer<'a, Reader, Analyzer>
where
    Reader: ConvertableTrajRead<'a>,
    Analyzer: FrameAnalyze,
{
    reader: Reader,
    analyzer: Analyzer,
    _phantom: PhantomData<&'a Reader>,
}

/// Trait implemented by structures that can be used as trajectory analyzers.
pub trait FrameAnalyze {
    type Error: std::error::Error + Send + Sync + Eq + PartialEq + 'static;
    type AnalysisResult;

    /// Analyze the `System` using the analyzer.
    /// Analyzer can be modified by this method.
    fn analyze(&mut self, system: &System) -> Result<Self::AnalysisResult, Self::Error>;
}

impl<'a, Reader, Analyzer> Iterator for TrajAnalyzer<'a, Reader, Analyzer>
where
    Reader: ConvertableTrajRead<'a>,
    Analyzer: FrameAnalyze,
{
    type Item = Result<Analyzer::AnalysisResult, TrajAnalysisError<Analyzer::Error>>;

    /// Read next frame of the trajectory and analyze it using the associated analyzer.
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let frame = match self.reader.next()? {
            Ok(x) => x,
            Err(e) => return Some(Err(TrajAnalysisError::ReadingError(e))),
        };

        match self.analyzer.analyze(frame) {
            Ok(x) => Some(Ok(x)),
            Err(e) => Some(Err(TrajAnalysisError::AnalysisError(e))),
        }
    }
}

/// Implemented by all trajectory readers that can be turned into analyzers.
pub trait ConvertableTrajRead<'a>: TrajMasterRead<'a> + Sized {
    /// Transform the trajectory reader into trajectory analyzer.
    #[inline(always)]
    fn analyze<A>(self, analyzer: A) -> TrajAnalyzer<'a, Self, A>
    where
        A: FrameAnalyze,
    {
        TrajAnalyzer {
            reader: self,
            analyzer,
            _phantom: PhantomData,
        }
    }
}

/// Blanket implementation of `ConvertableTrajRead` trait for all trajectory readers.
impl<'a, T> ConvertableTrajRead<'a> for T where T: TrajMasterRead<'a> {}

/******************************/
/*         UNIT TESTS         */
/******************************/
